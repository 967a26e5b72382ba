pub mod analysis;
mod config;
mod entry;
mod handlers;
pub mod semantic;
mod signature;
mod state;
pub mod text;

pub use entry::run;
pub use state::MsLanguageServer;

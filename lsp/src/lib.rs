pub mod server;

pub use server::{run, MsLanguageServer};

pub mod analyze;
pub mod assist;
pub mod builtins;
pub mod config;
pub mod runtime;
pub mod store;
pub mod token;
pub mod util;

pub use analyze::{AnalysisResult, MsAnalyzer};
pub use analyze::diagnostic::{Diagnostic, DiagnosticCode, LineRange, Severity};
pub use config::RuntimeConfig;
pub use token::{Token, TokenKind, Tokenizer};

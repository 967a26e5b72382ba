//! Interaction with the external interpreter executable: locating it, running it against a
//! buffer for authoritative syntax errors, and classifying its log output.

pub mod external;
pub mod output;
pub mod resolve;

#[cfg(test)]
mod runtime_test;

pub use external::{external_diagnostics, parse_interpreter_errors, run_interpreter_check};
pub use output::LogLevel;
pub use resolve::{executable_names, resolve_interpreter, resolve_interpreter_in};

use std::fmt;

use serde::Serialize;

pub const DIAGNOSTIC_SOURCE: &str = "ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
        })
    }
}

/// Stable identifier of the rule that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    DuplicateFunction,
    DuplicateVariable,
    UnusedVariable,
    UndefinedVariable,
    BuiltinArity,
    FunctionArity,
    InterpreterError,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::DuplicateFunction => "duplicate-function",
            DiagnosticCode::DuplicateVariable => "duplicate-variable",
            DiagnosticCode::UnusedVariable => "unused-variable",
            DiagnosticCode::UndefinedVariable => "undefined-variable",
            DiagnosticCode::BuiltinArity => "builtin-arity",
            DiagnosticCode::FunctionArity => "function-arity",
            DiagnosticCode::InterpreterError => "interpreter-error",
        }
    }
}

/// Zero-based range; columns count UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl LineRange {
    /// Whole-line range `(line, 0) .. (line, len(line))`.
    pub fn full_line(line: usize, text: &str) -> Self {
        let line = line as u32;
        Self {
            start_line: line,
            start_col: 0,
            end_line: line,
            end_col: utf16_len(text) as u32,
        }
    }
}

pub fn utf16_len(text: &str) -> usize {
    if text.is_ascii() {
        return text.len();
    }
    text.chars().map(char::len_utf16).sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: LineRange,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub source: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn new(range: LineRange, severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            code,
            source: DIAGNOSTIC_SOURCE,
            message: message.into(),
        }
    }

    /// Diagnostic spanning the whole of `lines[line]`.
    pub fn on_line(lines: &[&str], line: usize, severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        let text = lines.get(line).copied().unwrap_or_default();
        Self::new(LineRange::full_line(line, text), severity, code, message)
    }

    pub fn warning(lines: &[&str], line: usize, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::on_line(lines, line, Severity::Warning, code, message)
    }

    pub fn line(&self) -> usize {
        self.range.start_line as usize
    }
}

/// Stable sort by start position; diagnostics on the same position keep production order.
pub fn sort_by_location(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| (d.range.start_line, d.range.start_col));
}

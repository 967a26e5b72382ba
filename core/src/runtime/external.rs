use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::analyze::diagnostic::{Diagnostic, DiagnosticCode, Severity};

static ERROR_AT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ERROR:.*at line (\d+)").expect("valid interpreter error pattern"));

/// Runs `exe <tmpfile>` on a private copy of `content` and returns the captured output
/// (trimmed stderr, or trimmed stdout when stderr is empty). The file is removed on every path.
pub fn run_interpreter_check(exe: &Path, content: &str) -> anyhow::Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("ms_diag_")
        .suffix(".ms")
        .tempfile()
        .context("Failed to create temporary file for interpreter check")?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .context("Failed to write buffer to temporary file")?;
    // close our handle but keep the path until `tmp` drops
    let tmp = file.into_temp_path();

    let output = Command::new(exe)
        .arg(&*tmp)
        .output()
        .with_context(|| format!("Failed to run interpreter '{}'", exe.display()))?;
    drop(tmp);

    debug!(status = ?output.status, "interpreter check finished");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return Ok(stderr.to_string());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// One Error per `ERROR: ... at line N` line, anchored at document line `N-1` (clamped into the
/// document) and carrying the whole output as its message.
pub fn parse_interpreter_errors(output: &str, lines: &[&str]) -> Vec<Diagnostic> {
    let last_line = lines.len().saturating_sub(1);
    output
        .lines()
        .filter_map(|l| ERROR_AT_LINE.captures(l))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<usize>().ok())
        .map(|reported| {
            let line = reported.saturating_sub(1).min(last_line);
            Diagnostic::on_line(lines, line, Severity::Error, DiagnosticCode::InterpreterError, output)
        })
        .collect()
}

/// Interpreter diagnostics for a buffer; any failure contributes nothing.
pub fn external_diagnostics(exe: &Path, content: &str, lines: &[&str]) -> Vec<Diagnostic> {
    match run_interpreter_check(exe, content) {
        Ok(output) if output.is_empty() => Vec::new(),
        Ok(output) => parse_interpreter_errors(&output, lines),
        Err(err) => {
            warn!("interpreter check skipped: {err:#}");
            Vec::new()
        }
    }
}

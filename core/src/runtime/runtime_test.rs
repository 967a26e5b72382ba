use std::fs;
use std::path::{Path, PathBuf};

use super::output::{exit_message, style_line};
use super::*;
use crate::analyze::diagnostic::{DiagnosticCode, Severity};
use crate::analyze::split_lines;
use crate::config::RuntimeConfig;

fn touch(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, b"").unwrap();
    p
}

#[test]
fn test_explicit_runtime_is_returned_without_checks() {
    let cfg = RuntimeConfig {
        runtime_path: Some("/definitely/missing/ms".to_string()),
        auto_detect_runtime: false,
        ..Default::default()
    };
    assert_eq!(
        resolve_interpreter_in(&cfg, &[], None),
        Some(PathBuf::from("/definitely/missing/ms"))
    );
}

#[test]
fn test_auto_detect_disabled() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), executable_names()[0]);
    let cfg = RuntimeConfig {
        auto_detect_runtime: false,
        ..Default::default()
    };
    assert_eq!(resolve_interpreter_in(&cfg, &[], Some(dir.path().as_os_str())), None);
}

#[test]
fn test_search_paths_expand_workspace_folder_before_path_env() {
    let ws = tempfile::tempdir().unwrap();
    let bin = ws.path().join("target").join("release");
    fs::create_dir_all(&bin).unwrap();
    let in_ws = touch(&bin, executable_names()[1]);

    let on_path = tempfile::tempdir().unwrap();
    touch(on_path.path(), executable_names()[0]);

    let cfg = RuntimeConfig {
        search_paths: vec!["${workspaceFolder}/target/release".to_string()],
        ..Default::default()
    };
    let found = resolve_interpreter_in(&cfg, &[ws.path().to_path_buf()], Some(on_path.path().as_os_str()));
    assert_eq!(found, Some(in_ws));
}

#[test]
fn test_path_env_prefers_first_executable_name() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), executable_names()[1]);
    let preferred = touch(dir.path(), executable_names()[0]);
    let found = resolve_interpreter_in(&RuntimeConfig::default(), &[], Some(dir.path().as_os_str()));
    assert_eq!(found, Some(preferred));
}

#[test]
fn test_nothing_found() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        resolve_interpreter_in(&RuntimeConfig::default(), &[], Some(dir.path().as_os_str())),
        None
    );
}

#[test]
fn test_parse_interpreter_errors_maps_to_zero_based_lines() {
    let text = "a = 1\nb = 2\nc = (\nd = 4\n";
    let lines = split_lines(text);
    let output = "INFO: starting\nERROR: bad token at line 3";
    let diags = parse_interpreter_errors(output, &lines);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Severity::Error);
    assert_eq!(diags[0].code, DiagnosticCode::InterpreterError);
    assert_eq!(diags[0].range.start_line, 2);
    assert_eq!(diags[0].range.end_col, 5);
    assert_eq!(diags[0].message, output);
}

#[test]
fn test_parse_interpreter_errors_is_case_insensitive_and_clamped() {
    let lines = split_lines("x = 1");
    let diags = parse_interpreter_errors("error: unexpected EOF AT LINE 40\nError: x at line 0", &lines);
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].range.start_line, 0);
    assert_eq!(diags[1].range.start_line, 0);
}

#[test]
fn test_parse_interpreter_errors_ignores_other_lines() {
    let lines = split_lines("x = 1\n");
    assert!(parse_interpreter_errors("WARN: at line 1\nERROR: no location", &lines).is_empty());
}

#[test]
fn test_missing_executable_contributes_nothing() {
    let lines = split_lines("x = 1\n");
    let diags = external_diagnostics(Path::new("/definitely/missing/interpreter"), "x = 1\n", &lines);
    assert!(diags.is_empty());
    assert!(run_interpreter_check(Path::new("/definitely/missing/interpreter"), "").is_err());
}

#[test]
fn test_log_level_classification() {
    assert_eq!(LogLevel::classify("ERROR: boom"), LogLevel::Error);
    assert_eq!(LogLevel::classify("warn: careful"), LogLevel::Warn);
    assert_eq!(LogLevel::classify("Info: hi"), LogLevel::Info);
    assert_eq!(LogLevel::classify("DEBUG: x=1"), LogLevel::Debug);
    assert_eq!(LogLevel::classify("42"), LogLevel::Plain);
    assert_eq!(LogLevel::classify(" ERROR: indented"), LogLevel::Plain);
    assert_eq!(LogLevel::classify("é"), LogLevel::Plain);
}

#[test]
fn test_style_line() {
    assert_eq!(style_line("ERROR: x"), "\x1b[31mERROR: x\x1b[0m");
    assert_eq!(style_line("plain"), "plain");
    assert_eq!(exit_message(Some(3)), "Process exited with code 3");
}

#[cfg(unix)]
mod stub_interpreter {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    pub(super) fn write_stub(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("stub-ms");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_stub_error_becomes_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub(dir.path(), "echo 'ERROR: bad token at line 3' >&2\nexit 1");
        let text = "x = 1\ny = x\nz = (\n";
        let lines = split_lines(text);
        let diags = external_diagnostics(&stub, text, &lines);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].range.start_line, 2);
        assert_eq!(diags[0].message, "ERROR: bad token at line 3");
    }

    #[test]
    fn test_stdout_used_when_stderr_empty() {
        let dir = tempfile::tempdir().unwrap();
        let stub = write_stub(dir.path(), "echo 'ERROR: oops at line 1'");
        let output = run_interpreter_check(&stub, "x").unwrap();
        assert_eq!(output, "ERROR: oops at line 1");
    }

    #[test]
    fn test_temp_file_receives_buffer_and_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("seen");
        let stub = write_stub(
            dir.path(),
            &format!("echo \"$1\" > '{}'\ncat \"$1\"", record.display()),
        );
        let output = run_interpreter_check(&stub, "hello = 1\n").unwrap();
        assert_eq!(output, "hello = 1");

        let seen = fs::read_to_string(&record).unwrap();
        let tmp = PathBuf::from(seen.trim());
        assert!(tmp.file_name().unwrap().to_string_lossy().starts_with("ms_diag_"));
        assert_eq!(tmp.extension().unwrap(), "ms");
        assert!(!tmp.exists(), "temporary file should be deleted");
    }
}

use super::diagnostic::{DiagnosticCode, Severity};
use super::*;

fn messages(content: &str) -> Vec<(u32, String)> {
    MsAnalyzer::new()
        .analyze(content)
        .diagnostics
        .into_iter()
        .map(|d| (d.range.start_line, d.message))
        .collect()
}

#[test]
fn test_duplicate_variable() {
    let result = MsAnalyzer::new().analyze("x = 1\nx = 2\n");
    assert_eq!(result.diagnostics.len(), 1);
    let d = &result.diagnostics[0];
    assert_eq!(d.message, "Duplicate variable definition: x");
    assert_eq!(d.severity, Severity::Warning);
    assert_eq!(d.code, DiagnosticCode::DuplicateVariable);
    assert_eq!(d.range.start_line, 1);
    assert_eq!((d.range.start_col, d.range.end_col), (0, 5));
    // table keeps the later definition
    assert_eq!(result.symbols.variable("x").unwrap().line, 1);
}

#[test]
fn test_unused_variable() {
    assert_eq!(
        messages("y = 5\n"),
        vec![(0, "Variable 'y' is defined but never used".to_string())]
    );
}

#[test]
fn test_undefined_variable() {
    assert_eq!(
        messages("print(z)\n"),
        vec![(0, "Variable 'z' is used but not defined".to_string())]
    );
}

#[test]
fn test_undefined_reported_on_every_line_once() {
    let msgs = messages("print(q + q)\nprint(q)\n");
    assert_eq!(
        msgs,
        vec![
            (0, "Variable 'q' is used but not defined".to_string()),
            (1, "Variable 'q' is used but not defined".to_string()),
        ]
    );
}

#[test]
fn test_user_function_arity() {
    assert_eq!(
        messages("f(a,b) = a + b\nf(1)\n"),
        vec![(1, "Function 'f' expects 2 arguments, got 1".to_string())]
    );
}

#[test]
fn test_user_function_arity_is_exact() {
    let msgs = messages("f(a) = a\nf(1, 2)\n");
    assert_eq!(msgs, vec![(1, "Function 'f' expects 1 arguments, got 2".to_string())]);
}

#[test]
fn test_builtin_lower_bound() {
    assert_eq!(
        messages("sin()\n"),
        vec![(0, "Function 'sin' expects at least 1 arguments".to_string())]
    );
}

#[test]
fn test_builtin_lower_bound_allows_extra_arguments() {
    assert!(messages("print(1, 2, 3)\n").is_empty());
}

#[test]
fn test_unknown_calls_are_not_reported() {
    assert!(messages("mystery(1)\n").is_empty());
}

#[test]
fn test_duplicate_function() {
    let result = MsAnalyzer::new().analyze("g(x) = x\ng(x, y) = x * y\ng(1, 2)\n");
    // the first definition line is call-shaped and is checked against the final signature
    assert_eq!(
        result
            .diagnostics
            .iter()
            .map(|d| (d.range.start_line, d.message.as_str()))
            .collect::<Vec<_>>(),
        vec![
            (0, "Function 'g' expects 2 arguments, got 1"),
            (1, "Duplicate function definition: g"),
        ]
    );
    let g = result.symbols.function("g").unwrap();
    assert_eq!(g.line, 1);
    assert_eq!(g.parameters, vec!["x", "y"]);
    assert!(g.used);
}

#[test]
fn test_function_pattern_wins_over_variable_pattern() {
    let result = MsAnalyzer::new().analyze("h(t) = t\nh(2)\n");
    assert!(result.symbols.variables.is_empty());
    assert!(result.symbols.function("h").is_some());
}

#[test]
fn test_equality_is_not_a_definition() {
    let stat = analyze_static("a = 1\na == 2\n");
    assert_eq!(stat.symbols.variables.len(), 1);
    assert!(stat.diagnostics.is_empty());
}

#[test]
fn test_parameter_list_trimming() {
    let stat = analyze_static("  area( w ,  h , ) = w * h\n");
    let area = stat.symbols.function("area").unwrap();
    assert_eq!(area.parameters, vec!["w", "h"]);
    assert!(area.used, "definition line is itself call-shaped");
}

#[test]
fn test_comment_lines_do_not_count_as_uses() {
    assert_eq!(
        messages("y = 5\n# y is important\n"),
        vec![(0, "Variable 'y' is defined but never used".to_string())]
    );
}

#[test]
fn test_substring_heuristic_counts_partial_names() {
    // `x` occurs inside `max`, so it counts as used
    assert!(messages("x = 1\nmax = 2\nprint(max)\n").is_empty());
}

#[test]
fn test_names_in_both_tables_do_not_collide() {
    let stat = analyze_static("v = 1\nv(a) = a\nv(v)\n");
    assert!(stat.symbols.variable("v").is_some());
    assert!(stat.symbols.function("v").is_some());
    assert!(stat.diagnostics.is_empty());
}

#[test]
fn test_calls_and_strings_and_binders_are_not_undefined() {
    assert!(messages("print(\"hello world\")\n").is_empty());
    assert!(messages("lim {x -> 0} sin(x)/x\n").is_empty());
    assert!(messages("import calculus\n").is_empty());
    assert!(messages("print(pi * e)\n").is_empty());
}

#[test]
fn test_derivative_variable_is_bound() {
    assert!(messages("print(d/d x (x^2))\n").is_empty());
    assert!(messages("print(d^2/d t^2 (t^3 + t))\n").is_empty());
    // binding is per line
    assert_eq!(
        messages("print(d/d x (x^2))\nprint(x)\n"),
        vec![(1, "Variable 'x' is used but not defined".to_string())]
    );
}

#[test]
fn test_multiline_docstring_words_are_not_identifiers() {
    let src = "\"\"\"\nComputes the area of a circle\n\"\"\"\narea(r) = pi * r ^ 2\nprint(area(2))\n";
    assert!(messages(src).is_empty());

    let stat = analyze_static("\"\"\"\nsee w below\n\"\"\"\nprint(w)\n");
    assert_eq!(stat.usage.undefined_uses, vec![("w".to_string(), 3)]);
}

#[test]
fn test_variable_uses_are_recorded_per_line() {
    let stat = analyze_static("r = 2\narea = pi * r ^ 2\nprint(area)\n");
    // `print` contains `r`
    assert_eq!(stat.usage.variable_uses["r"], vec![0, 1, 2]);
    assert_eq!(stat.usage.variable_uses["area"], vec![1, 2]);
    assert!(stat.diagnostics.is_empty());
}

#[test]
fn test_call_records() {
    let stat = analyze_static("print(sin(x), 2)\n");
    let calls: Vec<(&str, usize)> = stat
        .usage
        .calls
        .iter()
        .map(|c| (c.name.as_str(), c.arguments.len()))
        .collect();
    // `[^)]*` stops at the first `)`, so the outer call swallows the inner name
    assert_eq!(calls, vec![("print", 1)]);
    assert_eq!(stat.usage.calls[0].arguments, vec!["sin(x"]);
}

#[test]
fn test_diagnostics_are_ordered_by_line() {
    let content = "f(a) = a\nunused = 1\nf()\nsin()\n";
    let lines: Vec<u32> = MsAnalyzer::new()
        .analyze(content)
        .diagnostics
        .iter()
        .map(|d| d.range.start_line)
        .collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_static_analysis_is_idempotent() {
    let content = "x = 1\nx = 2\nf(a,b) = a + b\nf(1)\nprint(z)\nsin()\n";
    let a = MsAnalyzer::new().analyze(content).diagnostics;
    let b = MsAnalyzer::new().analyze(content).diagnostics;
    assert_eq!(a, b);
}

#[test]
fn test_diagnostics_never_exceed_line_count() {
    let content = "x = 1\r\ny = x\r\nprint(w)";
    let count = split_lines(content).len() as u32;
    for d in MsAnalyzer::new().analyze(content).diagnostics {
        assert!(d.range.start_line < count);
        assert_eq!(d.range.start_line, d.range.end_line);
    }
}

#[test]
fn test_split_lines_keeps_trailing_empty_line() {
    assert_eq!(split_lines("a\r\nb\n"), vec!["a", "b", ""]);
    assert_eq!(split_lines(""), vec![""]);
}

#[test]
fn test_missing_interpreter_is_skipped() {
    let analyzer = MsAnalyzer::new().with_interpreter(Some(PathBuf::from("/definitely/missing/ms")));
    let result = analyzer.analyze("y = 5\n");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
}

#[cfg(unix)]
#[test]
fn test_external_merge_with_stub_interpreter() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let stub = dir.path().join("stub-ms");
    std::fs::write(&stub, "#!/bin/sh\necho 'ERROR: bad token at line 3'\n").unwrap();
    std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

    let content = "a = 1\nb = 2\nc = (\nsin()\n";
    let result = MsAnalyzer::new().with_interpreter(Some(stub)).analyze(content);
    let errors: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].range.start_line, 2);
    assert_eq!(errors[0].message, "ERROR: bad token at line 3");
    assert!(result.diagnostics.iter().any(|d| d.severity == Severity::Warning));
    // interpreter diagnostics lead their line
    let line2: Vec<_> = result.diagnostics.iter().filter(|d| d.range.start_line == 2).collect();
    assert_eq!(line2[0].severity, Severity::Error);
}

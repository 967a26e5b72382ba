use once_cell::sync::Lazy;
use regex::Regex;

use super::diagnostic::{Diagnostic, DiagnosticCode};
use super::symbols::{SymbolTable, match_function_definition, split_list};
use crate::builtins;
use crate::token::{Token, TokenKind, tokenize};
use crate::util::fast_map::{FastHashMap, FastHashSet, fast_hash_map_new, fast_hash_set_new};

static CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)").expect("valid call pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub arguments: Vec<String>,
    pub line: usize,
}

/// Everything the second pass observed, before rules are applied.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    /// Lines (ascending) on which each defined variable's name occurs, definition line included.
    pub variable_uses: FastHashMap<String, Vec<usize>>,
    /// Identifier uses with no variable definition, in source order, one per name per line.
    pub undefined_uses: Vec<(String, usize)>,
    pub calls: Vec<CallSite>,
}

pub(crate) fn is_comment_line(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Every non-overlapping `name(args)` on the line, left to right.
pub fn scan_calls(line: &str) -> impl Iterator<Item = (&str, Vec<String>)> {
    CALL.captures_iter(line).filter_map(|caps| {
        let name = caps.get(1)?.as_str();
        let args = caps.get(2).map(|m| split_list(m.as_str())).unwrap_or_default();
        Some((name, args))
    })
}

/// Identifier tokens of one line that do not resolve to any known symbol. `tokens` are the
/// line's share of the whole-document token stream, with offsets into `source`.
fn unresolved_on_line<'s>(source: &'s str, line: &str, tokens: &[Token], table: &SymbolTable) -> Vec<&'s str> {
    if tokens
        .first()
        .is_some_and(|t| t.kind == TokenKind::Keyword && t.text(source) == "import")
    {
        return Vec::new();
    }

    let params = match_function_definition(line).map(|(_, p)| p).unwrap_or_default();
    let mut bound: FastHashSet<&str> = fast_hash_set_new();

    let mut out: Vec<&str> = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind != TokenKind::Identifier {
            continue;
        }
        let name = tok.text(source);
        let next = tokens.get(i + 1).map(|t| t.text(source));
        if next == Some("->") {
            // binder, e.g. `lim {x -> 0} sin(x)/x`
            bound.insert(name);
            continue;
        }
        if i >= 2 && tokens[i - 1].text(source) == "d" && tokens[i - 2].text(source) == "/" {
            // derivative variable, `d/d x expr` or `d^2/d x^2 expr`
            bound.insert(name);
            continue;
        }
        // call position, including applied forms like `lim {x -> 0}`
        if matches!(next, Some("(") | Some("{"))
            || bound.contains(name)
            || params.iter().any(|p| p == name)
            || table.variables.contains_key(name)
            || table.functions.contains_key(name)
            || out.contains(&name)
        {
            continue;
        }
        out.push(name);
    }
    out
}

/// Undefined identifier uses in source order, one per name per line. The document is lexed as a
/// whole so words inside multi-line strings never count as identifiers.
fn unresolved_identifiers(lines: &[&str], table: &SymbolTable) -> Vec<(String, usize)> {
    let source = lines.join("\n");
    let line_starts: Vec<usize> = lines
        .iter()
        .scan(0, |next, l| {
            let start = *next;
            *next += l.len() + 1;
            Some(start)
        })
        .collect();

    let tokens = tokenize(&source);
    let mut out = Vec::new();
    let mut rest = tokens.as_slice();
    while let Some(first) = rest.first() {
        let line = line_starts.partition_point(|&s| s <= first.start) - 1;
        let line_end = line_starts.get(line + 1).copied().unwrap_or(usize::MAX);
        let (group, tail) = rest.split_at(rest.partition_point(|t| t.start < line_end));
        rest = tail;
        for name in unresolved_on_line(&source, lines[line], group, table) {
            out.push((name.to_string(), line));
        }
    }
    out
}

/// Second pass: records calls (marking user functions used), textual variable uses and
/// uses of names with no definition.
pub fn collect_usages(lines: &[&str], table: &mut SymbolTable) -> UsageIndex {
    let mut index = UsageIndex {
        variable_uses: fast_hash_map_new(),
        undefined_uses: Vec::new(),
        calls: Vec::new(),
    };

    for (idx, line) in lines.iter().enumerate() {
        for (name, arguments) in scan_calls(line) {
            table.mark_function_used(name);
            index.calls.push(CallSite {
                name: name.to_string(),
                arguments,
                line: idx,
            });
        }

        if is_comment_line(line) {
            continue;
        }

        for var in table.variable_order.iter() {
            if line.contains(var.as_str()) {
                index.variable_uses.entry(var.clone()).or_default().push(idx);
            }
        }
    }

    index.undefined_uses = unresolved_identifiers(lines, table);
    index
}

/// Applies the unused, undefined and arity rules to a completed usage index.
pub fn usage_diagnostics(lines: &[&str], table: &SymbolTable, usage: &UsageIndex) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    for def in table.variables_in_order() {
        let uses = usage.variable_uses.get(&def.name).map_or(0, Vec::len);
        if uses <= 1 {
            diags.push(Diagnostic::warning(
                lines,
                def.line,
                DiagnosticCode::UnusedVariable,
                format!("Variable '{}' is defined but never used", def.name),
            ));
        }
    }

    for (name, line) in &usage.undefined_uses {
        diags.push(Diagnostic::warning(
            lines,
            *line,
            DiagnosticCode::UndefinedVariable,
            format!("Variable '{}' is used but not defined", name),
        ));
    }

    for call in &usage.calls {
        // at-least for built-ins (may be variadic), exact for user functions
        if let Some(min) = builtins::function(&call.name).and_then(|b| b.min_arguments()) {
            if call.arguments.len() < min {
                diags.push(Diagnostic::warning(
                    lines,
                    call.line,
                    DiagnosticCode::BuiltinArity,
                    format!("Function '{}' expects at least {} arguments", call.name, min),
                ));
            }
        }
        if let Some(def) = table.function(&call.name) {
            if call.arguments.len() != def.parameters.len() {
                diags.push(Diagnostic::warning(
                    lines,
                    call.line,
                    DiagnosticCode::FunctionArity,
                    format!(
                        "Function '{}' expects {} arguments, got {}",
                        call.name,
                        def.parameters.len(),
                        call.arguments.len()
                    ),
                ));
            }
        }
    }

    diags
}

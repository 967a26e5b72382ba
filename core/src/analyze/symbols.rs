use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::diagnostic::{Diagnostic, DiagnosticCode};
use crate::util::fast_map::{FastHashMap, fast_hash_map_new};

static FUNCTION_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)\s*=").expect("valid function pattern"));
static VARIABLE_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=([^=].*)$").expect("valid variable pattern"));

/// Placeholder type label; no inference is performed.
pub const UNKNOWN_TYPE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDefinition {
    pub name: String,
    pub line: usize,
    pub inferred_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub line: usize,
    pub parameters: Vec<String>,
    pub used: bool,
}

/// Variables and functions live in independent tables; one name may appear in both.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    pub variables: FastHashMap<String, VariableDefinition>,
    pub functions: FastHashMap<String, FunctionDefinition>,
    /// First-definition order of variable names.
    #[serde(skip)]
    pub(crate) variable_order: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            variables: fast_hash_map_new(),
            functions: fast_hash_map_new(),
            variable_order: Vec::new(),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }

    /// Variables in the order their names were first defined.
    pub fn variables_in_order(&self) -> impl Iterator<Item = &VariableDefinition> {
        self.variable_order.iter().filter_map(|n| self.variables.get(n))
    }

    pub(crate) fn mark_function_used(&mut self, name: &str) {
        if let Some(f) = self.functions.get_mut(name) {
            f.used = true;
        }
    }

    fn define_function(&mut self, name: &str, line: usize, parameters: Vec<String>) -> bool {
        let duplicate = self.functions.contains_key(name);
        self.functions.insert(
            name.to_string(),
            FunctionDefinition {
                name: name.to_string(),
                line,
                parameters,
                used: false,
            },
        );
        duplicate
    }

    fn define_variable(&mut self, name: &str, line: usize) -> bool {
        let duplicate = self.variables.contains_key(name);
        if !duplicate {
            self.variable_order.push(name.to_string());
        }
        self.variables.insert(
            name.to_string(),
            VariableDefinition {
                name: name.to_string(),
                line,
                inferred_type: UNKNOWN_TYPE,
            },
        );
        duplicate
    }
}

/// Comma-split, trimmed, non-empty entries of a parenthesised list.
pub(crate) fn split_list(inner: &str) -> Vec<String> {
    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Matches `name(params) =` at the start of a line.
pub fn match_function_definition(line: &str) -> Option<(&str, Vec<String>)> {
    let caps = FUNCTION_DEF.captures(line)?;
    let name = caps.get(1)?.as_str();
    let params = caps.get(2).map(|m| split_list(m.as_str())).unwrap_or_default();
    Some((name, params))
}

/// Matches `name = value` at the start of a line, excluding `name == ...`.
pub fn match_variable_definition(line: &str) -> Option<&str> {
    VARIABLE_DEF.captures(line)?.get(1).map(|m| m.as_str())
}

/// First pass: definitions plus duplicate-definition warnings. Function pattern wins over
/// the variable pattern on the same line.
pub fn build_symbol_table(lines: &[&str]) -> (SymbolTable, Vec<Diagnostic>) {
    let mut table = SymbolTable::new();
    let mut diags = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some((name, params)) = match_function_definition(line) {
            if table.define_function(name, idx, params) {
                diags.push(Diagnostic::warning(
                    lines,
                    idx,
                    DiagnosticCode::DuplicateFunction,
                    format!("Duplicate function definition: {}", name),
                ));
            }
            continue;
        }
        if let Some(name) = match_variable_definition(line) {
            if table.define_variable(name, idx) {
                diags.push(Diagnostic::warning(
                    lines,
                    idx,
                    DiagnosticCode::DuplicateVariable,
                    format!("Duplicate variable definition: {}", name),
                ));
            }
        }
    }

    (table, diags)
}

use std::path::PathBuf;

use tracing::debug;

pub mod diagnostic;
pub mod symbols;
pub mod usage;

#[cfg(test)]
mod analyze_test;

use diagnostic::{Diagnostic, sort_by_location};
use symbols::{SymbolTable, build_symbol_table};
use usage::{UsageIndex, collect_usages, usage_diagnostics};

use crate::runtime::external::external_diagnostics;

/// Splits on `\n`, dropping a trailing `\r`, keeping a final empty line like editors do.
pub fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}

/// Output of the two static passes.
#[derive(Debug, Clone)]
pub struct StaticAnalysis {
    pub symbols: SymbolTable,
    pub usage: UsageIndex,
    pub diagnostics: Vec<Diagnostic>,
}

/// Symbol builder followed by the usage analyzer. Pure; no I/O.
pub fn analyze_static(content: &str) -> StaticAnalysis {
    let lines = split_lines(content);
    let (mut symbols, mut diagnostics) = build_symbol_table(&lines);
    let usage = collect_usages(&lines, &mut symbols);
    diagnostics.extend(usage_diagnostics(&lines, &symbols, &usage));
    StaticAnalysis {
        symbols,
        usage,
        diagnostics,
    }
}

/// Result of analyzing one document revision.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Static and interpreter diagnostics, ordered by location.
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTable,
}

/// Analysis pipeline: interpreter check (when an executable is known), symbol builder,
/// usage analyzer, merge.
#[derive(Debug, Clone, Default)]
pub struct MsAnalyzer {
    interpreter: Option<PathBuf>,
}

impl MsAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interpreter(mut self, interpreter: Option<PathBuf>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn interpreter(&self) -> Option<&PathBuf> {
        self.interpreter.as_ref()
    }

    pub fn analyze(&self, content: &str) -> AnalysisResult {
        let lines = split_lines(content);
        let external = match &self.interpreter {
            Some(exe) => external_diagnostics(exe, content, &lines),
            None => Vec::new(),
        };

        let StaticAnalysis {
            symbols, diagnostics, ..
        } = analyze_static(content);

        let merged = merge_diagnostics(external, diagnostics);
        debug!(
            lines = lines.len(),
            diagnostics = merged.len(),
            interpreter = self.interpreter.is_some(),
            "analysis finished"
        );
        AnalysisResult {
            diagnostics: merged,
            symbols,
        }
    }
}

/// One location-ordered collection; interpreter diagnostics come first within a line.
pub fn merge_diagnostics(external: Vec<Diagnostic>, static_diags: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut all = external;
    all.extend(static_diags);
    sort_by_location(&mut all);
    all
}

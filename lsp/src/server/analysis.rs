use ms_core::runtime::resolve_interpreter;
use ms_core::{MsAnalyzer, Severity};
use tokio::task;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range, Url};
use tracing::{debug, warn};

use super::state::MsLanguageServer;

/// Core diagnostic to its LSP form; columns are already UTF-16.
pub fn to_lsp_diagnostic(d: &ms_core::Diagnostic) -> Diagnostic {
    Diagnostic {
        range: Range::new(
            Position::new(d.range.start_line, d.range.start_col),
            Position::new(d.range.end_line, d.range.end_col),
        ),
        severity: Some(match d.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Information => DiagnosticSeverity::INFORMATION,
        }),
        code: Some(NumberOrString::String(d.code.as_str().to_string())),
        source: Some(d.source.to_string()),
        message: d.message.clone(),
        ..Default::default()
    }
}

impl MsLanguageServer {
    /// Runs the full pipeline off the async runtime and publishes the result if no newer run for
    /// the same document started meanwhile.
    pub(crate) async fn analyze_and_publish(&self, uri: Url) {
        let Some((content, version)) = self.document_snapshot(&uri) else {
            return;
        };
        let revision = self.diagnostics.begin(&uri);
        let config = self.runtime_config();
        let folders = self.workspace_folders();

        let computed = task::spawn_blocking(move || {
            let interpreter = resolve_interpreter(&config, &folders);
            MsAnalyzer::new().with_interpreter(interpreter).analyze(&content)
        })
        .await;
        let result = match computed {
            Ok(result) => result,
            Err(err) => {
                warn!("analysis task failed for {uri}: {err}");
                return;
            }
        };

        if !self.diagnostics.publish(&uri, revision, result.diagnostics) {
            return;
        }
        let Some(snapshot) = self.diagnostics.snapshot(&uri) else {
            return;
        };
        let lsp_diagnostics: Vec<Diagnostic> = snapshot.iter().map(to_lsp_diagnostic).collect();
        // a newer run may have begun since the store accepted this one; the send itself is
        // still not atomic with the store
        if !self.diagnostics.is_current(&uri, revision) {
            debug!(%uri, revision = revision.get(), "superseded before sending");
            return;
        }
        debug!(%uri, count = lsp_diagnostics.len(), revision = revision.get(), "publishing diagnostics");
        self.client
            .publish_diagnostics(uri, lsp_diagnostics, Some(version))
            .await;
    }

    pub(crate) async fn clear_diagnostics(&self, uri: Url) {
        self.diagnostics.clear(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    pub(crate) async fn reanalyze_open_documents(&self) {
        let uris: Vec<Url> = self.documents.iter().map(|e| e.key().clone()).collect();
        for uri in uris {
            self.analyze_and_publish(uri).await;
        }
    }
}

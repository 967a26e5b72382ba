use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ms_core::assist::{CompletionKind, completion_catalogue};
use ms_core::store::DiagnosticStore;
use ms_core::RuntimeConfig;
use ropey::Rope;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Documentation, MarkupContent, MarkupKind, Url};
use tower_lsp::Client;

/// In-memory representation of an open ms document.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
}

/// Primary LSP server state shared across handlers.
pub struct MsLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) config: Mutex<RuntimeConfig>,
    pub(crate) workspace_folders: Mutex<Vec<PathBuf>>,
    pub(crate) diagnostics: DiagnosticStore<Url>,
}

impl MsLanguageServer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            config: Mutex::new(RuntimeConfig::default()),
            workspace_folders: Mutex::new(Vec::new()),
            diagnostics: DiagnosticStore::new(),
        }
    }

    pub(crate) fn runtime_config(&self) -> RuntimeConfig {
        self.config.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub(crate) fn workspace_folders(&self) -> Vec<PathBuf> {
        self.workspace_folders.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub(crate) fn document_snapshot(&self, uri: &Url) -> Option<(String, i32)> {
        let doc = self.documents.get(uri)?;
        Some((doc.content.to_string(), doc.version))
    }

    /// Last diagnostics published for `uri`, if any run has completed since it was opened.
    pub fn published_diagnostics(&self, uri: &Url) -> Option<Arc<Vec<ms_core::Diagnostic>>> {
        self.diagnostics.snapshot(uri)
    }

    pub(crate) fn get_completions(&self) -> Vec<CompletionItem> {
        completion_catalogue()
            .into_iter()
            .map(|entry| CompletionItem {
                label: entry.label.to_string(),
                kind: Some(match entry.kind {
                    CompletionKind::Function => CompletionItemKind::FUNCTION,
                    CompletionKind::Constant => CompletionItemKind::CONSTANT,
                    CompletionKind::Keyword => CompletionItemKind::KEYWORD,
                }),
                detail: entry.detail.map(str::to_string),
                documentation: entry.documentation.map(|doc| {
                    Documentation::MarkupContent(MarkupContent {
                        kind: MarkupKind::Markdown,
                        value: doc.to_string(),
                    })
                }),
                ..Default::default()
            })
            .collect()
    }
}

use std::path::PathBuf;

use ms_core::assist;
use ropey::Rope;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::{debug, info};

use super::{
    semantic::{encode_semantic_tokens, legend},
    signature::signature_help_for,
    state::{Document, MsLanguageServer},
    text::{apply_change, byte_to_utf16_col, line_text, utf16_to_byte_col},
};

#[allow(deprecated)]
fn workspace_paths(params: &InitializeParams) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = params
        .workspace_folders
        .iter()
        .flatten()
        .filter_map(|f| f.uri.to_file_path().ok())
        .collect();
    if paths.is_empty() {
        if let Some(root) = params.root_uri.as_ref().and_then(|u| u.to_file_path().ok()) {
            paths.push(root);
        }
    }
    paths
}

#[tower_lsp::async_trait]
impl LanguageServer for MsLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let folders = workspace_paths(&params);
        info!(?folders, "ms language server initializing");
        if let Ok(mut guard) = self.workspace_folders.lock() {
            *guard = folders;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                    ..Default::default()
                })),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: None,
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    retrigger_characters: None,
                    work_done_progress_options: Default::default(),
                }),
                semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(
                    SemanticTokensOptions {
                        work_done_progress_options: Default::default(),
                        legend: legend(),
                        range: Some(false),
                        full: Some(SemanticTokensFullOptions::Bool(true)),
                    },
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "ms Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("ms language server initialized");
        let _ = self
            .client
            .log_message(MessageType::INFO, "ms language server started")
            .await;
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("ms language server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if !self.apply_pushed_settings(params.settings) {
            self.load_config().await;
        }
        // interpreter resolution may have changed
        self.reanalyze_open_documents().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let document = Document {
            content: Rope::from_str(&params.text_document.text),
            version: params.text_document.version,
        };
        self.documents.insert(uri.clone(), document);
        self.analyze_and_publish(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some(mut doc) = self.documents.get_mut(&params.text_document.uri) else {
            debug!(uri = %params.text_document.uri, "change for a document that is not open");
            return;
        };
        doc.version = params.text_document.version;
        for change in &params.content_changes {
            apply_change(&mut doc.content, change);
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(text) = params.text {
            if let Some(mut doc) = self.documents.get_mut(&uri) {
                doc.content = Rope::from_str(&text);
            }
        }
        self.analyze_and_publish(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.clear_diagnostics(uri).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        if !self.runtime_config().enable_hover_docstrings {
            return Ok(None);
        }
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some((content, _)) = self.document_snapshot(uri) else {
            return Ok(None);
        };

        let line = line_text(&content, position.line);
        let col = utf16_to_byte_col(line, position.character);
        let Some(info) = assist::hover(&content, position.line as usize, col) else {
            return Ok(None);
        };
        let range = Range::new(
            Position::new(position.line, byte_to_utf16_col(line, info.start)),
            Position::new(position.line, byte_to_utf16_col(line, info.end)),
        );
        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: info.markdown,
            }),
            range: Some(range),
        }))
    }

    async fn completion(&self, _params: CompletionParams) -> Result<Option<CompletionResponse>> {
        if !self.runtime_config().enable_completions {
            return Ok(None);
        }
        Ok(Some(CompletionResponse::Array(self.get_completions())))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        if !self.runtime_config().enable_signature_help {
            return Ok(None);
        }
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some((content, _)) = self.document_snapshot(uri) else {
            return Ok(None);
        };

        let col = utf16_to_byte_col(line_text(&content, position.line), position.character);
        Ok(assist::signature_help(&content, position.line as usize, col).map(signature_help_for))
    }

    async fn semantic_tokens_full(&self, params: SemanticTokensParams) -> Result<Option<SemanticTokensResult>> {
        if !self.runtime_config().enable_semantic_tokens {
            return Ok(None);
        }
        let Some((content, _)) = self.document_snapshot(&params.text_document.uri) else {
            return Ok(None);
        };
        let data = tokio::task::spawn_blocking(move || encode_semantic_tokens(&content))
            .await
            .unwrap_or_default();
        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens { result_id: None, data })))
    }
}

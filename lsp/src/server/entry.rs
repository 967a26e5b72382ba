use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use super::state::MsLanguageServer;

pub async fn run() {
    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(MsLanguageServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

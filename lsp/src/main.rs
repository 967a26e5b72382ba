#[tokio::main]
async fn main() {
    ms_lsp::run().await;
}

//! Language server for Trellis markup (`.tml`) and style sheets (`.tss`),
//! speaking LSP over stdio.

use tower_lsp::{LspService, Server};

mod analysis;
mod backend;
mod knowledge;

#[tokio::main]
async fn main() {
    let (service, socket) = LspService::new(backend::Backend::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}

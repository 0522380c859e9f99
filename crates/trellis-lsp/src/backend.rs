//! LSP backend: document store, diagnostics, hover, and completion.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use trellis::{ErrorKind, ParseError, Parser, ParserConfig};

use crate::analysis::{completion_context, tag_names, word_at, Context};
use crate::knowledge::{builtin, PrefabInfo};

// ── Configuration ─────────────────────────────────────────────────────────────

/// `initializationOptions` sent by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Element names accepted in documents. Empty means "whatever the
    /// document itself uses".
    pub definitions: Vec<String>,
    pub parse_styles: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { definitions: Vec::new(), parse_styles: true }
    }
}

// ── Documents ─────────────────────────────────────────────────────────────────

struct Document {
    text: String,
    /// Element names accepted while parsing this document.
    definitions: BTreeSet<String>,
    prefabs: Vec<PrefabInfo>,
}

// ── Backend ───────────────────────────────────────────────────────────────────

pub struct Backend {
    client: Client,
    config: Arc<RwLock<Config>>,
    docs: Arc<RwLock<HashMap<Url, Document>>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            config: Arc::new(RwLock::new(Config::default())),
            docs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn update(&self, uri: Url, text: String) {
        let config = self.config.read().await.clone();
        let (doc, diagnostics) = if is_style_sheet(&uri) {
            let diagnostics = match trellis::parse_styles(text.as_bytes()) {
                Ok(_) => vec![],
                Err(e) => vec![diagnostic(&e)],
            };
            (Document { text, definitions: BTreeSet::new(), prefabs: vec![] }, diagnostics)
        } else {
            analyze(text, &config)
        };

        self.client.publish_diagnostics(uri.clone(), diagnostics, None).await;
        self.docs.write().await.insert(uri, doc);
    }
}

fn is_style_sheet(uri: &Url) -> bool {
    uri.path().ends_with(".tss")
}

/// Parse a markup document, collecting its prefabs even when the parse fails
/// part-way through.
fn analyze(text: String, config: &Config) -> (Document, Vec<Diagnostic>) {
    let definitions: BTreeSet<String> = if config.definitions.is_empty() {
        tag_names(&text)
    } else {
        config.definitions.iter().cloned().collect()
    };

    let mut parser = Parser::with_config(ParserConfig {
        parse_styles: config.parse_styles,
        ..ParserConfig::default()
    });
    parser.add_definitions(definitions.iter().cloned());

    let diagnostics = match parser.parse(text.as_bytes()) {
        Ok(_) => vec![],
        Err(e) => vec![diagnostic(&e)],
    };

    let mut prefabs: Vec<PrefabInfo> = parser.prefabs().values().map(PrefabInfo::new).collect();
    prefabs.sort_by(|a, b| a.name.cmp(&b.name));

    (Document { text, definitions, prefabs }, diagnostics)
}

// ── LanguageServer impl ───────────────────────────────────────────────────────

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options {
            match serde_json::from_value::<Config>(options) {
                Ok(config) => *self.config.write().await = config,
                Err(e) => {
                    self.client
                        .log_message(MessageType::WARNING, format!("ignoring initializationOptions: {e}"))
                        .await;
                }
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![
                        "<".to_string(),
                        " ".to_string(),
                        "!".to_string(),
                    ]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "trellis-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        let config = self.config.read().await;
        let message = if config.definitions.is_empty() {
            "trellis-lsp ready, definitions taken from each document".to_string()
        } else {
            format!("trellis-lsp ready, {} definitions", config.definitions.len())
        };
        self.client.log_message(MessageType::INFO, message).await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    // ── Document lifecycle ────────────────────────────────────────────────────

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.update(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // FULL sync: the last change holds the whole text.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.update(params.text_document.uri, change.text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.docs.write().await.remove(&params.text_document.uri);
    }

    // ── Hover ─────────────────────────────────────────────────────────────────

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let pos = &params.text_document_position_params.position;

        let docs = self.docs.read().await;
        let Some(doc) = docs.get(uri) else {
            return Ok(None);
        };
        let Some(word) = word_at(&doc.text, pos) else {
            return Ok(None);
        };

        if let Some(prefab) = doc.prefabs.iter().find(|p| p.name == word) {
            return Ok(Some(markdown_hover(prefab.doc())));
        }
        if let Some(b) = builtin(word) {
            return Ok(Some(markdown_hover(format!("**{}**\n\n{}", b.name, b.doc))));
        }
        if doc.definitions.contains(word) {
            return Ok(Some(markdown_hover(format!("**{word}** · element"))));
        }
        Ok(None)
    }

    // ── Completion ────────────────────────────────────────────────────────────

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let pos = &params.text_document_position.position;

        let docs = self.docs.read().await;
        let Some(doc) = docs.get(uri) else {
            return Ok(None);
        };

        let items = match completion_context(&doc.text, pos) {
            Context::Tag => tag_items(doc),
            Context::Attribute { element } => attribute_items(doc, &element),
            Context::Value { .. } | Context::Unknown => vec![],
        };

        Ok(Some(CompletionResponse::Array(items)))
    }
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

fn diagnostic(e: &ParseError) -> Diagnostic {
    // ParseError line/col are 1-based; LSP Position is 0-based.
    let line = e.line.saturating_sub(1) as u32;
    let col = e.col.saturating_sub(1) as u32;
    let code = match &e.kind {
        ErrorKind::Style(_) => "style",
        _ => "syntax",
    };
    Diagnostic {
        range: Range {
            start: Position::new(line, col),
            end: Position::new(line, col + 1),
        },
        severity: Some(DiagnosticSeverity::ERROR),
        code: Some(NumberOrString::String(code.to_string())),
        source: Some("trellis-lsp".to_string()),
        message: e.kind.to_string(),
        ..Default::default()
    }
}

// ── Completion item builders ──────────────────────────────────────────────────

fn tag_items(doc: &Document) -> Vec<CompletionItem> {
    let elements = doc.definitions.iter().map(|name| {
        let mut item = CompletionItem::new_simple(name.clone(), "element".to_string());
        item.kind = Some(CompletionItemKind::CLASS);
        item
    });
    let prefabs = doc.prefabs.iter().map(|p| {
        let mut item = CompletionItem::new_simple(p.name.clone(), "prefab".to_string());
        item.kind = Some(CompletionItemKind::MODULE);
        item.insert_text = Some(p.snippet());
        item.insert_text_format = Some(InsertTextFormat::SNIPPET);
        item
    });
    elements.chain(prefabs).collect()
}

fn attribute_items(doc: &Document, element: &str) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = doc
        .prefabs
        .iter()
        .find(|p| p.name == element)
        .map(|p| {
            p.parameters
                .iter()
                .map(|param| attribute_item(param, "prefab parameter"))
                .collect()
        })
        .unwrap_or_default();
    items.push(attribute_item("style", "inline style block"));
    items
}

fn attribute_item(name: &str, detail: &str) -> CompletionItem {
    let mut item = CompletionItem::new_simple(name.to_string(), detail.to_string());
    item.kind = Some(CompletionItemKind::PROPERTY);
    item.insert_text = Some(format!("{name}=\"$0\""));
    item.insert_text_format = Some(InsertTextFormat::SNIPPET);
    item
}

// ── Misc helpers ──────────────────────────────────────────────────────────────

fn markdown_hover(md: String) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: md,
        }),
        range: None,
    }
}

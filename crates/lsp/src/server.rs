//! LSP server main loop with request/notification dispatch.
//!
//! Uses `lsp-server` (synchronous, crossbeam-based) for the transport. Every
//! message is handled to completion before the next one is read, so the
//! document caches never need locking.

use lsp_server::{Connection, ErrorCode, Message, Notification, Request, Response};
use lsp_types::notification::{
    DidChangeTextDocument, DidChangeWorkspaceFolders, DidCloseTextDocument, DidOpenTextDocument,
    DidSaveTextDocument, Notification as _, PublishDiagnostics,
};
use lsp_types::request::{
    CodeActionRequest, ColorPresentationRequest, Completion, DocumentColor,
    DocumentSymbolRequest, GotoDefinition, Request as _,
};
use lsp_types::{
    CodeActionKind, CodeActionOptions, CodeActionOrCommand, CodeActionParams,
    CodeActionProviderCapability, ColorInformation, ColorPresentation, ColorPresentationParams,
    ColorProviderCapability, CompletionOptions, CompletionParams, CompletionResponse,
    DidChangeTextDocumentParams, DidChangeWorkspaceFoldersParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, DocumentColorParams,
    DocumentSymbolParams, DocumentSymbolResponse, GotoDefinitionParams, GotoDefinitionResponse,
    InitializeParams, OneOf, PublishDiagnosticsParams, SaveOptions, ServerCapabilities,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions, WorkspaceFoldersServerCapabilities, WorkspaceServerCapabilities,
};
use locale_core::Config;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::code_actions;
use crate::colors;
use crate::completion;
use crate::diagnostics;
use crate::document::{DocumentState, TextDocument};
use crate::navigation::{word_at_position, WorkspaceIndex};

/// Run the LSP server over stdio until shutdown.
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let (connection, io_threads) = Connection::stdio();

    // ── Initialize handshake ──────────────────────────────────────────
    let server_capabilities = build_capabilities();
    let init_json = serde_json::to_value(&server_capabilities)?;
    let init_params: InitializeParams = serde_json::from_value(connection.initialize(init_json)?)?;
    let mut session = Session::from_initialize(config, &init_params);
    info!(
        related_information = session.related_information,
        "locale language server initialized"
    );

    // ── Main loop ─────────────────────────────────────────────────────
    for msg in &connection.receiver {
        match msg {
            Message::Request(req) => {
                if connection.handle_shutdown(&req)? {
                    break;
                }
                handle_request(&connection, &mut session, req)?;
            }
            Message::Notification(not) => {
                handle_notification(&connection, &mut session, not)?;
            }
            Message::Response(_) => {
                // Ignore responses (we don't send requests to the client)
            }
        }
    }

    io_threads.join()?;
    info!("locale language server stopped");
    Ok(())
}

pub fn build_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::FULL),
                save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                    include_text: Some(false),
                })),
                ..Default::default()
            },
        )),
        definition_provider: Some(OneOf::Left(true)),
        document_symbol_provider: Some(OneOf::Left(true)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec![".".into()]),
            resolve_provider: Some(false),
            ..Default::default()
        }),
        color_provider: Some(ColorProviderCapability::Simple(true)),
        code_action_provider: Some(CodeActionProviderCapability::Options(CodeActionOptions {
            code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
            ..Default::default()
        })),
        workspace: Some(WorkspaceServerCapabilities {
            workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                supported: Some(true),
                change_notifications: Some(OneOf::Left(true)),
            }),
            file_operations: None,
        }),
        ..Default::default()
    }
}

fn handle_request(
    connection: &Connection,
    session: &mut Session,
    req: Request,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(method = req.method.as_str(), "request");
    let resp = match session.handle_request(&req.method, req.params) {
        Ok(Some(result)) => Response::new_ok(req.id, result),
        Ok(None) => Response::new_err(
            req.id,
            ErrorCode::MethodNotFound as i32,
            format!("method not found: {}", req.method),
        ),
        Err(e) => {
            warn!(method = req.method.as_str(), error = %e, "invalid request params");
            Response::new_err(req.id, ErrorCode::InvalidParams as i32, e.to_string())
        }
    };
    connection.sender.send(Message::Response(resp))?;
    Ok(())
}

fn handle_notification(
    connection: &Connection,
    session: &mut Session,
    not: Notification,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(method = not.method.as_str(), "notification");
    match session.handle_notification(&not.method, not.params) {
        Ok(published) => {
            for params in published {
                publish_diagnostics(connection, params)?;
            }
        }
        Err(e) => warn!(method = not.method.as_str(), error = %e, "invalid notification params"),
    }
    Ok(())
}

/// Send `textDocument/publishDiagnostics` notification to the client.
fn publish_diagnostics(
    connection: &Connection,
    params: PublishDiagnosticsParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let not = Notification::new(PublishDiagnostics::METHOD.to_string(), params);
    connection.sender.send(Message::Notification(not))?;
    Ok(())
}

/// Server state shared by all handlers: open buffers, the workspace index,
/// and settings negotiated at initialization.
pub struct Session {
    documents: DocumentState,
    index: WorkspaceIndex,
    config: Config,
    related_information: bool,
}

impl Session {
    pub fn new(config: Config, related_information: bool) -> Self {
        Self {
            documents: DocumentState::new(),
            index: WorkspaceIndex::new(),
            related_information: related_information || config.related_information,
            config,
        }
    }

    /// Build a session from the client's `initialize` request.
    ///
    /// `initializationOptions` may override any configuration field.
    pub fn from_initialize(config: Config, params: &InitializeParams) -> Self {
        let config = match &params.initialization_options {
            Some(options) => merge_options(config, options),
            None => config,
        };
        let client_related = params
            .capabilities
            .text_document
            .as_ref()
            .and_then(|t| t.publish_diagnostics.as_ref())
            .and_then(|p| p.related_information)
            .unwrap_or(false);
        Self::new(config, client_related)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &WorkspaceIndex {
        &self.index
    }

    /// Dispatch a request. `Ok(None)` means the method is not supported.
    pub fn handle_request(
        &mut self,
        method: &str,
        params: Value,
    ) -> Result<Option<Value>, serde_json::Error> {
        let result = match method {
            m if m == DocumentSymbolRequest::METHOD => {
                serde_json::to_value(self.document_symbols(serde_json::from_value(params)?))?
            }
            m if m == GotoDefinition::METHOD => {
                serde_json::to_value(self.goto_definition(serde_json::from_value(params)?))?
            }
            m if m == Completion::METHOD => {
                serde_json::to_value(self.completion(serde_json::from_value(params)?))?
            }
            m if m == DocumentColor::METHOD => {
                serde_json::to_value(self.document_colors(serde_json::from_value(params)?))?
            }
            m if m == ColorPresentationRequest::METHOD => {
                serde_json::to_value(self.color_presentations(serde_json::from_value(params)?))?
            }
            m if m == CodeActionRequest::METHOD => {
                serde_json::to_value(self.code_actions(serde_json::from_value(params)?))?
            }
            _ => return Ok(None),
        };
        Ok(Some(result))
    }

    /// Apply a notification and return the diagnostics to publish.
    pub fn handle_notification(
        &mut self,
        method: &str,
        params: Value,
    ) -> Result<Vec<PublishDiagnosticsParams>, serde_json::Error> {
        let published = match method {
            m if m == DidOpenTextDocument::METHOD => {
                vec![self.did_open(serde_json::from_value(params)?)]
            }
            m if m == DidChangeTextDocument::METHOD => self
                .did_change(serde_json::from_value(params)?)
                .into_iter()
                .collect(),
            m if m == DidSaveTextDocument::METHOD => self
                .did_save(serde_json::from_value(params)?)
                .into_iter()
                .collect(),
            m if m == DidCloseTextDocument::METHOD => {
                vec![self.did_close(serde_json::from_value(params)?)]
            }
            m if m == DidChangeWorkspaceFolders::METHOD => {
                self.did_change_workspace_folders(serde_json::from_value(params)?);
                Vec::new()
            }
            _ => Vec::new(),
        };
        Ok(published)
    }

    pub fn did_open(&mut self, params: DidOpenTextDocumentParams) -> PublishDiagnosticsParams {
        let item = params.text_document;
        info!(uri = item.uri.as_str(), "opened");
        let doc = self.documents.open(TextDocument::new(
            item.uri,
            item.language_id,
            item.version,
            item.text,
        ));
        let index = self.index.load(doc);
        let diagnostics = diagnostics::validate(doc, index, self.related_information);
        publish_params(doc, diagnostics)
    }

    pub fn did_change(
        &mut self,
        params: DidChangeTextDocumentParams,
    ) -> Option<PublishDiagnosticsParams> {
        let uri = params.text_document.uri.as_str().to_string();
        // FULL sync: last content change has the entire document
        let change = params.content_changes.into_iter().last()?;
        let Some(doc) = self
            .documents
            .change(&uri, params.text_document.version, change.text)
        else {
            warn!(uri = uri.as_str(), "change for a document that is not open");
            return None;
        };
        let index = self.index.load(doc);
        let diagnostics = diagnostics::validate(doc, index, self.related_information);
        Some(publish_params(doc, diagnostics))
    }

    pub fn did_save(&mut self, params: DidSaveTextDocumentParams) -> Option<PublishDiagnosticsParams> {
        let doc = self.documents.get(params.text_document.uri.as_str())?;
        let index = self.index.get_or_load(doc);
        let diagnostics = diagnostics::validate(doc, index, self.related_information);
        Some(publish_params(doc, diagnostics))
    }

    pub fn did_close(&mut self, params: DidCloseTextDocumentParams) -> PublishDiagnosticsParams {
        let uri = params.text_document.uri;
        info!(uri = uri.as_str(), "closed");
        self.documents.close(uri.as_str());
        self.index.remove(uri.as_str());
        // Clear diagnostics for closed file
        PublishDiagnosticsParams {
            uri,
            diagnostics: Vec::new(),
            version: None,
        }
    }

    pub fn did_change_workspace_folders(&mut self, params: DidChangeWorkspaceFoldersParams) {
        for folder in params.event.removed {
            let removed = self.index.remove_by_prefix(folder.uri.as_str());
            info!(folder = folder.uri.as_str(), removed, "workspace folder removed");
        }
    }

    pub fn document_symbols(
        &mut self,
        params: DocumentSymbolParams,
    ) -> Option<DocumentSymbolResponse> {
        let uri = params.text_document.uri.as_str();
        let symbols = match self.documents.get(uri) {
            Some(doc) => self.index.symbols(doc),
            None => self.index.get(uri)?.symbols.clone(),
        };
        Some(DocumentSymbolResponse::Nested(symbols))
    }

    pub fn goto_definition(&self, params: GotoDefinitionParams) -> Option<GotoDefinitionResponse> {
        let position = params.text_document_position_params;
        let doc = self
            .documents
            .get(position.text_document.uri.as_str())?;
        let word = word_at_position(doc.text(), position.position)?;
        let links = self.index.find_definitions(&word);
        if links.is_empty() {
            None
        } else {
            Some(GotoDefinitionResponse::Link(links))
        }
    }

    pub fn completion(&self, params: CompletionParams) -> CompletionResponse {
        let position = params.text_document_position;
        let content = self
            .documents
            .get(position.text_document.uri.as_str())
            .map(|doc| doc.text())
            .unwrap_or_default();
        CompletionResponse::Array(completion::compute_completions(
            &self.index,
            position.position,
            content,
        ))
    }

    pub fn document_colors(&self, params: DocumentColorParams) -> Vec<ColorInformation> {
        self.documents
            .get(params.text_document.uri.as_str())
            .map(colors::document_colors)
            .unwrap_or_default()
    }

    pub fn color_presentations(&self, params: ColorPresentationParams) -> Vec<ColorPresentation> {
        colors::color_presentations(params.color, params.range)
    }

    pub fn code_actions(&self, params: CodeActionParams) -> Vec<CodeActionOrCommand> {
        let Some(doc) = self.documents.get(params.text_document.uri.as_str()) else {
            return Vec::new();
        };
        code_actions::code_actions(doc, &params.context.diagnostics, &self.config.language_id)
            .into_iter()
            .map(CodeActionOrCommand::CodeAction)
            .collect()
    }
}

fn publish_params(
    doc: &TextDocument,
    diagnostics: Vec<lsp_types::Diagnostic>,
) -> PublishDiagnosticsParams {
    debug!(
        uri = doc.uri().as_str(),
        count = diagnostics.len(),
        "validated"
    );
    PublishDiagnosticsParams {
        uri: doc.uri().clone(),
        diagnostics,
        version: Some(doc.version()),
    }
}

/// Overlay `initializationOptions` on top of the file configuration.
fn merge_options(config: Config, options: &Value) -> Config {
    let Some(overrides) = options.as_object() else {
        return config;
    };
    let mut base = match serde_json::to_value(&config) {
        Ok(Value::Object(map)) => map,
        _ => return config,
    };
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    match serde_json::from_value(Value::Object(base)) {
        Ok(merged) => merged,
        Err(e) => {
            warn!(error = %e, "ignoring invalid initializationOptions");
            config
        }
    }
}

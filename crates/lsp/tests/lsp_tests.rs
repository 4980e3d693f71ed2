//! Integration tests for the locale language server.
//!
//! These tests drive a `Session` with protocol-shaped JSON params (the same
//! payloads an editor sends) without a live stdio connection.

use locale_core::Config;
use locale_lsp::Session;
use lsp_types::{
    CodeActionOrCommand, ColorInformation, CompletionResponse, DocumentSymbolResponse,
    GotoDefinitionResponse, PublishDiagnosticsParams,
};
use serde_json::{json, Value};

const GREETING_URI: &str = "file:///workspace/mod/locale/en/greeting.cfg";
const ITEMS_URI: &str = "file:///workspace/mod/locale/en/items.cfg";

/// Helper: a session whose client supports related information.
fn session() -> Session {
    Session::new(Config::default(), true)
}

fn open(session: &mut Session, uri: &str, text: &str) -> PublishDiagnosticsParams {
    let published = session
        .handle_notification(
            "textDocument/didOpen",
            json!({
                "textDocument": {
                    "uri": uri,
                    "languageId": "factorio-locale",
                    "version": 1,
                    "text": text,
                }
            }),
        )
        .expect("valid didOpen params");
    assert_eq!(published.len(), 1);
    published.into_iter().next().unwrap()
}

fn request(session: &mut Session, method: &str, params: Value) -> Value {
    session
        .handle_request(method, params)
        .expect("valid params")
        .expect("supported method")
}

fn position_params(uri: &str, line: u32, character: u32) -> Value {
    json!({
        "textDocument": { "uri": uri },
        "position": { "line": line, "character": character },
    })
}

/// The example from the format documentation: one repeated section.
const DUPLICATE_SECTION: &str = "[greeting]\nhello=Hello!\n[greeting]\nbye=Bye!\n";

// ──────────────────────────────────────────────
// Diagnostics
// ──────────────────────────────────────────────

#[test]
fn open_publishes_duplicate_section_diagnostic() {
    let mut s = session();
    let published = open(&mut s, GREETING_URI, DUPLICATE_SECTION);

    assert_eq!(published.uri.as_str(), GREETING_URI);
    assert_eq!(published.version, Some(1));
    assert_eq!(published.diagnostics.len(), 1);
    let diag = &published.diagnostics[0];
    assert_eq!(diag.message, "Duplicate Section");
    assert_eq!(diag.range.start.line, 2);
    let related = diag.related_information.as_ref().expect("related info");
    assert_eq!(related[0].location.range.start.line, 0);
}

#[test]
fn change_revalidates_full_content() {
    let mut s = session();
    open(&mut s, GREETING_URI, DUPLICATE_SECTION);

    let published = s
        .handle_notification(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": GREETING_URI, "version": 2 },
                "contentChanges": [{ "text": "[greeting]\nhello=Hello!\nbye=Bye!\n" }],
            }),
        )
        .unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].version, Some(2));
    assert!(published[0].diagnostics.is_empty());
}

#[test]
fn change_for_unknown_document_publishes_nothing() {
    let mut s = session();
    let published = s
        .handle_notification(
            "textDocument/didChange",
            json!({
                "textDocument": { "uri": ITEMS_URI, "version": 2 },
                "contentChanges": [{ "text": "a=1" }],
            }),
        )
        .unwrap();
    assert!(published.is_empty());
}

#[test]
fn save_republishes_current_diagnostics() {
    let mut s = session();
    open(&mut s, ITEMS_URI, "[items]\niron=Iron\niron=Iron again\n");
    let published = s
        .handle_notification(
            "textDocument/didSave",
            json!({ "textDocument": { "uri": ITEMS_URI } }),
        )
        .unwrap();
    assert_eq!(published[0].diagnostics.len(), 1);
    assert_eq!(published[0].diagnostics[0].message, "Duplicate Key");
}

#[test]
fn close_clears_diagnostics_and_index() {
    let mut s = session();
    open(&mut s, GREETING_URI, DUPLICATE_SECTION);
    let published = s
        .handle_notification(
            "textDocument/didClose",
            json!({ "textDocument": { "uri": GREETING_URI } }),
        )
        .unwrap();
    assert!(published[0].diagnostics.is_empty());
    assert!(s.index().is_empty());
}

#[test]
fn malformed_notification_params_are_rejected() {
    let mut s = session();
    assert!(s
        .handle_notification("textDocument/didOpen", json!({ "nope": true }))
        .is_err());
    assert!(s
        .handle_notification("$/unknownNotification", json!(null))
        .unwrap()
        .is_empty());
}

// ──────────────────────────────────────────────
// Symbols, definitions, completion
// ──────────────────────────────────────────────

#[test]
fn document_symbols_are_nested() {
    let mut s = session();
    open(&mut s, ITEMS_URI, "title=Items\n[item-name]\niron-plate=Iron plate\n");
    let result = request(
        &mut s,
        "textDocument/documentSymbol",
        json!({ "textDocument": { "uri": ITEMS_URI } }),
    );
    let response: DocumentSymbolResponse = serde_json::from_value(result).unwrap();
    let DocumentSymbolResponse::Nested(symbols) = response else {
        panic!("expected nested symbols");
    };
    let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["title", "item-name"]);
    assert_eq!(symbols[1].children.as_ref().unwrap()[0].name, "iron-plate");
}

#[test]
fn goto_definition_searches_all_documents() {
    let mut s = session();
    open(&mut s, ITEMS_URI, "[item-name]\niron-plate=Iron plate\n");
    open(
        &mut s,
        GREETING_URI,
        "[greeting]\nhello=See [item-name.iron-plate]\n",
    );

    let result = request(
        &mut s,
        "textDocument/definition",
        position_params(GREETING_URI, 1, 20),
    );
    let response: GotoDefinitionResponse = serde_json::from_value(result).unwrap();
    let GotoDefinitionResponse::Link(links) = response else {
        panic!("expected location links");
    };
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target_uri.as_str(), ITEMS_URI);
    assert_eq!(links[0].target_range.start.line, 1);
}

#[test]
fn goto_definition_unknown_name_returns_null() {
    let mut s = session();
    open(&mut s, ITEMS_URI, "[item-name]\niron-plate=Iron plate\n");
    let result = request(
        &mut s,
        "textDocument/definition",
        position_params(ITEMS_URI, 1, 14),
    );
    assert!(result.is_null());
}

#[test]
fn completion_lists_namespaces_then_keys() {
    let mut s = session();
    open(&mut s, ITEMS_URI, "[item-name]\niron-plate=Iron plate\ncopper-plate=Copper\n");
    open(&mut s, GREETING_URI, "x=[item-name.\n");

    let result = request(&mut s, "textDocument/completion", position_params(GREETING_URI, 0, 13));
    let response: CompletionResponse = serde_json::from_value(result).unwrap();
    let CompletionResponse::Array(items) = response else {
        panic!("expected completion array");
    };
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, ["item-name.iron-plate", "item-name.copper-plate"]);
}

#[test]
fn removing_workspace_folder_drops_its_documents() {
    let mut s = session();
    open(&mut s, ITEMS_URI, "[item-name]\niron-plate=Iron plate\n");
    open(&mut s, "file:///elsewhere/other.cfg", "[other]\nk=v\n");

    s.handle_notification(
        "workspace/didChangeWorkspaceFolders",
        json!({
            "event": {
                "added": [],
                "removed": [{ "uri": "file:///workspace/mod", "name": "mod" }],
            }
        }),
    )
    .unwrap();

    assert_eq!(s.index().len(), 1);
    assert!(s.index().find_definitions("item-name.iron-plate").is_empty());
    assert_eq!(s.index().find_definitions("other.k").len(), 1);
}

// ──────────────────────────────────────────────
// Colors
// ──────────────────────────────────────────────

#[test]
fn document_colors_and_presentations() {
    let mut s = session();
    open(&mut s, ITEMS_URI, "[s]\nk=[color=128,255,0]Go[/color]\n");

    let result = request(
        &mut s,
        "textDocument/documentColor",
        json!({ "textDocument": { "uri": ITEMS_URI } }),
    );
    let colors: Vec<ColorInformation> = serde_json::from_value(result).unwrap();
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].range.start.character, 9);
    assert_eq!(colors[0].range.end.character, 18);

    let result = request(
        &mut s,
        "textDocument/colorPresentation",
        json!({
            "textDocument": { "uri": ITEMS_URI },
            "color": colors[0].color,
            "range": colors[0].range,
        }),
    );
    let labels: Vec<String> = result
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["label"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(labels, ["#80ff00", "128, 255, 0", "0.502, 1, 0"]);
}

// ──────────────────────────────────────────────
// Code actions
// ──────────────────────────────────────────────

#[test]
fn code_action_round_trips_diagnostic_data() {
    let mut s = session();
    let published = open(&mut s, GREETING_URI, DUPLICATE_SECTION);

    // Diagnostics come back from the client as JSON, data included.
    let result = request(
        &mut s,
        "textDocument/codeAction",
        json!({
            "textDocument": { "uri": GREETING_URI },
            "range": published.diagnostics[0].range,
            "context": { "diagnostics": published.diagnostics },
        }),
    );
    let actions: Vec<CodeActionOrCommand> = serde_json::from_value(result).unwrap();
    assert_eq!(actions.len(), 1);
    let CodeActionOrCommand::CodeAction(action) = &actions[0] else {
        panic!("expected a code action");
    };
    assert_eq!(action.title, "Merge Sections");

    let changes = action.edit.as_ref().unwrap().changes.as_ref().unwrap();
    let edits = changes.values().next().unwrap();
    assert_eq!(edits[0].new_text, "");
    assert_eq!(edits[0].range.start.line, 2);
    assert_eq!(edits[0].range.end.line, 3);
    assert_eq!(edits[1].new_text, "\nbye=Bye!");
    assert_eq!(edits[1].range.start.line, 1);
}

#[test]
fn unsupported_request_is_reported() {
    let mut s = session();
    assert!(s
        .handle_request("textDocument/hover", position_params(ITEMS_URI, 0, 0))
        .unwrap()
        .is_none());
}

#[test]
fn initialize_options_override_config() {
    let params: lsp_types::InitializeParams = serde_json::from_value(json!({
        "capabilities": {},
        "initializationOptions": { "language_id": "ini", "related_information": true },
    }))
    .unwrap();
    let s = Session::from_initialize(Config::default(), &params);
    assert_eq!(s.config().language_id, "ini");
    assert!(s.config().related_information);
    assert_eq!(s.config().extensions, ["cfg"]);
}

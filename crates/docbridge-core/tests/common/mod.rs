use docbridge_core::{handle_request, MemoryDocument, Request, Response};
use docbridge_core_types::RequestId;
use serde_json::Value;

/// Create a fresh document named "Test Doc" with the default font set
#[allow(dead_code)]
pub fn new_document() -> MemoryDocument {
    MemoryDocument::new("Test Doc")
}

/// Send one command through the full request path
#[allow(dead_code)]
pub async fn send(doc: &mut MemoryDocument, command: &str, args: Value) -> Response {
    let request = Request::new(RequestId::new(), command, args);
    handle_request(doc, request).await
}

/// Send a command that must succeed and return the created or touched entity id
#[allow(dead_code)]
pub async fn send_ok(doc: &mut MemoryDocument, command: &str, args: Value) -> String {
    let response = send(doc, command, args).await;
    assert!(response.ok, "{} failed: {:?}", command, response.error);
    response
        .result
        .as_ref()
        .and_then(|r| r.as_entity())
        .map(|d| d.id.clone())
        .expect("entity descriptor in result")
}

/// Send a command that must fail and return its error message
#[allow(dead_code)]
pub async fn send_err(doc: &mut MemoryDocument, command: &str, args: Value) -> String {
    let response = send(doc, command, args).await;
    assert!(!response.ok, "{} unexpectedly succeeded", command);
    assert!(response.result.is_none());
    response.error.expect("error message")
}

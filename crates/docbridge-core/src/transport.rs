//! Message channels
//!
//! [`serve_lines`] runs the bridge over any line-oriented byte stream: one
//! JSON request per line in, one JSON response per line out, strictly in
//! arrival order. [`CommandChannel`] is the sending side used by the plan
//! runner.

use async_trait::async_trait;
use docbridge_core_types::RequestId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::dispatch::handle_request;
use crate::envelope::{Request, Response};
use crate::errors::{BridgeError, Result};
use crate::host::DocumentHost;

/// Serve requests until `reader` reaches end of input
///
/// Blank lines are ignored. A line that is not UTF-8 is answered like any
/// other malformed request. Returns the number of responses written.
///
/// # Errors
///
/// Only I/O failures on the streams end the loop early; command failures are
/// reported in-band.
pub async fn serve_lines<H, R, W>(host: &mut H, mut reader: R, mut writer: W) -> Result<usize>
where
    H: DocumentHost + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut served = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match Request::parse(line) {
                Ok(request) => handle_request(host, request).await,
                Err(rejection) => {
                    tracing::warn!(error = rejection.error.as_deref().unwrap_or_default(), "rejected malformed request");
                    rejection
                }
            },
            Err(_) => {
                tracing::warn!(bytes = buf.len(), "rejected request line that is not UTF-8");
                Response::failure(
                    RequestId::unknown(),
                    &BridgeError::MalformedRequest {
                        reason: "invalid UTF-8".to_string(),
                    },
                )
            }
        };

        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
        served += 1;
    }

    tracing::debug!(served, "input closed");
    Ok(served)
}

/// Sending side of a bridge: one request in, its response out
#[async_trait]
pub trait CommandChannel: Send {
    /// Deliver `request` and wait for its response
    ///
    /// # Errors
    ///
    /// Fails only when the channel itself breaks; command failures arrive as
    /// `ok: false` responses.
    async fn send(&mut self, request: Request) -> Result<Response>;
}

/// Channel that dispatches directly into an owned host
pub struct LocalChannel<H> {
    host: H,
}

impl<H: DocumentHost> LocalChannel<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

#[async_trait]
impl<H: DocumentHost> CommandChannel for LocalChannel<H> {
    async fn send(&mut self, request: Request) -> Result<Response> {
        Ok(handle_request(&mut self.host, request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use serde_json::{json, Value};

    async fn serve(input: &[u8]) -> Vec<Value> {
        let mut doc = MemoryDocument::new("Wire");
        let mut out = Vec::new();
        let served = serve_lines(&mut doc, input, &mut out).await.unwrap();
        let responses: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), served);
        responses
    }

    #[tokio::test]
    async fn test_one_response_per_line() {
        let input = concat!(
            r#"{"id":"a","command":"status"}"#,
            "\n\n",
            r#"{"id":"b","command":"nope"}"#,
            "\n",
            "garbage\n",
        );
        let responses = serve(input.as_bytes()).await;
        assert_eq!(responses.len(), 3);

        assert_eq!(responses[0]["id"], "a");
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[0]["result"]["fileName"], "Wire");

        assert_eq!(responses[1], json!({"id": "b", "ok": false, "error": "Unsupported command: nope"}));

        assert_eq!(responses[2]["id"], "unknown");
        assert_eq!(responses[2]["ok"], false);
    }

    #[tokio::test]
    async fn test_non_utf8_line_is_answered_and_serving_continues() {
        let mut input = br#"{"id":"a","command":"status"}"#.to_vec();
        input.extend_from_slice(b"\n\xff\xfe\n");
        input.extend_from_slice(br#"{"id":"b","command":"status"}"#);
        input.push(b'\n');

        let responses = serve(&input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], "a");
        assert_eq!(
            responses[1],
            json!({"id": "unknown", "ok": false, "error": "Malformed request: invalid UTF-8"})
        );
        assert_eq!(responses[2]["id"], "b");
        assert_eq!(responses[2]["ok"], true);
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_served() {
        let responses = serve(br#"{"id":"z","command":"status"}"#).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], "z");
    }

    #[tokio::test]
    async fn test_local_channel() {
        let mut channel = LocalChannel::new(MemoryDocument::default());
        let response = channel
            .send(Request::new(RequestId::from("p1"), "create-page", json!({"name": "Two"})))
            .await
            .unwrap();
        assert!(response.ok);
        assert_eq!(channel.host().root_children().len(), 2);
    }
}

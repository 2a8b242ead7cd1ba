use anyhow::Context as _;
use futures::StreamExt as _;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::io::AsyncBufReadExt as _;
use tokio_util::io::StreamReader;

const SESSION_HEADER: &str = "mcp-session-id";

/// Test-only JSON-RPC client for the `/mcp` streamable HTTP endpoint.
///
/// `headers` ride along on every POST, which is how tests exercise header forwarding.
pub struct McpStreamableHttpSession {
    client: reqwest::Client,
    endpoint: String,
    headers: HeaderMap,
}

impl McpStreamableHttpSession {
    pub async fn connect(base_url: &str) -> anyhow::Result<Self> {
        Self::connect_with_headers(base_url, HeaderMap::new()).await
    }

    pub async fn connect_with_headers(base_url: &str, headers: HeaderMap) -> anyhow::Result<Self> {
        let mut session = Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/mcp", base_url.trim_end_matches('/')),
            headers,
        };

        let resp = session
            .post(&json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "swagger-mcp-integration-tests", "version": "0" }
                }
            }))
            .await?;
        let session_id = resp
            .headers()
            .get(SESSION_HEADER)
            .cloned()
            .context("initialize response carries no session id")?;
        let init = first_sse_message(resp).await?;
        anyhow::ensure!(init["id"] == 0, "unexpected initialize reply: {init}");
        session.headers.insert(SESSION_HEADER, session_id);

        let ack = session
            .post(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await?;
        anyhow::ensure!(
            ack.status() == reqwest::StatusCode::ACCEPTED,
            "notifications/initialized answered {}",
            ack.status()
        );
        Ok(session)
    }

    pub async fn request(
        &self,
        id: u64,
        method: &str,
        params: Value,
        timeout_dur: Duration,
    ) -> anyhow::Result<Value> {
        let resp = self
            .post(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await?;
        tokio::time::timeout(timeout_dur, first_sse_message(resp))
            .await
            .with_context(|| format!("no reply to {method} within {timeout_dur:?}"))?
    }

    pub async fn call_tool(
        &self,
        id: u64,
        name: &str,
        arguments: Value,
    ) -> anyhow::Result<ToolText> {
        let msg = self
            .request(
                id,
                "tools/call",
                json!({ "name": name, "arguments": arguments }),
                Duration::from_secs(20),
            )
            .await?;
        ToolText::from_message(&msg)
    }

    async fn post(&self, body: &Value) -> anyhow::Result<reqwest::Response> {
        self.client
            .post(&self.endpoint)
            .header(
                ACCEPT,
                HeaderValue::from_static("application/json, text/event-stream"),
            )
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .context("POST /mcp")?
            .error_for_status()
            .context("POST /mcp status")
    }
}

/// First text block of a `tools/call` result, with its error flag.
#[derive(Debug)]
pub struct ToolText {
    pub text: String,
    pub is_error: bool,
}

impl ToolText {
    fn from_message(msg: &Value) -> anyhow::Result<Self> {
        let text = msg
            .pointer("/result/content/0/text")
            .and_then(Value::as_str)
            .with_context(|| format!("tools/call reply has no text content: {msg}"))?;
        Ok(Self {
            text: text.to_string(),
            is_error: msg
                .pointer("/result/isError")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    pub fn json(&self) -> anyhow::Result<Value> {
        serde_json::from_str(&self.text).context("tool result text is not JSON")
    }
}

/// Read server-sent events until one carries a JSON payload.
async fn first_sse_message(resp: reqwest::Response) -> anyhow::Result<Value> {
    let body = Box::pin(resp.bytes_stream().map(|r| r.map_err(std::io::Error::other)));
    let mut lines = tokio::io::BufReader::new(StreamReader::new(body)).lines();

    let mut data = String::new();
    while let Some(line) = lines.next_line().await? {
        match line.trim_end() {
            "" if data.is_empty() => {}
            "" => return serde_json::from_str(&data).context("event data is not JSON"),
            field => {
                // Priming events carry an empty data field.
                if let Some(chunk) = field.strip_prefix("data:").map(str::trim)
                    && !chunk.is_empty()
                {
                    data.push_str(chunk);
                }
            }
        }
    }
    anyhow::bail!("event stream closed before a message arrived")
}

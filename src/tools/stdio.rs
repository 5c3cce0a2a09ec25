use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::application::BankService;

use super::{Tool, ToolError, ToolOutput, invoke};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<ToolError> for RpcError {
    fn from(e: ToolError) -> Self {
        RpcError::new(e.code(), e.to_string())
    }
}

/// Line-delimited JSON-RPC 2.0 server exposing the analytical tools.
///
/// Requests are handled one at a time. The store is reloaded before every
/// tool call so rows written by other processes are visible.
pub struct StdioServer {
    service: BankService,
}

impl StdioServer {
    pub fn new(service: BankService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &BankService {
        &self.service
    }

    /// Serve until the reader reaches end of input.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("tool server listening on stdio");
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line, Utc::now()) {
                let mut text = serde_json::to_string(&response)?;
                text.push('\n');
                writer.write_all(text.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("tool server input closed");
        Ok(())
    }

    /// Handle one raw request line. Notifications produce no response.
    pub fn handle_line(&mut self, line: &str, now: DateTime<Utc>) -> Option<Value> {
        let request: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                return Some(error_response(
                    Value::Null,
                    RpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
                ));
            }
        };

        let id = request.get("id").cloned();
        let method = match request.get("method").and_then(Value::as_str) {
            Some(method) => method.to_string(),
            None => {
                return Some(error_response(
                    id.unwrap_or(Value::Null),
                    RpcError::new(INVALID_REQUEST, "Invalid request: missing method"),
                ));
            }
        };
        let params = request.get("params").cloned().unwrap_or(Value::Null);

        debug!(method = %method, notification = id.is_none(), "rpc request");
        let result = self.dispatch(&method, params, now);

        let id = id?;
        Some(match result {
            Ok(value) => json!({ "jsonrpc": "2.0", "id": id, "result": value }),
            Err(e) => error_response(id, e),
        })
    }

    fn dispatch(&mut self, method: &str, params: Value, now: DateTime<Utc>) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                },
                "capabilities": { "tools": {} }
            })),
            "ping" => Ok(json!({})),
            "tools/list" => {
                let tools: Vec<Value> = Tool::ALL.iter().map(Tool::descriptor).collect();
                Ok(json!({ "tools": tools }))
            }
            "tools/call" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RpcError::new(INVALID_PARAMS, "tools/call requires a name"))?
                    .to_string();
                let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

                Ok(match self.run_tool(&name, arguments, now) {
                    Ok(output) => json!({
                        "content": [{ "type": "text", "text": render(&output) }],
                        "isError": false
                    }),
                    Err(e) => json!({
                        "content": [{ "type": "text", "text": e.to_string() }],
                        "isError": true
                    }),
                })
            }
            other => match Tool::from_str(other) {
                Some(_) => {
                    let output = self.run_tool(other, params, now)?;
                    serde_json::to_value(output)
                        .map_err(|e| RpcError::new(INVALID_PARAMS, e.to_string()))
                }
                None => Err(RpcError::new(
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", other),
                )),
            },
        }
    }

    fn run_tool(
        &mut self,
        name: &str,
        arguments: Value,
        now: DateTime<Utc>,
    ) -> Result<ToolOutput, ToolError> {
        let result = Tool::from_str(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
            .and_then(|tool| {
                self.service.reload()?;
                invoke(&self.service, tool, arguments, now)
            });

        match &result {
            Ok(output) => info!(tool = %output.tool, count = output.count, "tool call"),
            Err(e) => warn!(tool = name, error = %e, "tool call failed"),
        }
        result
    }
}

fn render(output: &ToolOutput) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|_| output.summary.clone())
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": error.code, "message": error.message }
    })
}

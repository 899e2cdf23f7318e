//! Newline-delimited JSON-RPC 2.0 on stdin/stdout.
//!
//! Supported methods: `initialize`, `ping`, `tools/list`, `tools/call`, `resources/list`,
//! `resources/read` (`discovery://info`). Requests without an `id` are notifications and get
//! no answer. Only protocol frames are written to stdout.

use anyhow::Result;
use log::{debug, info, warn};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::client::PetClient;
use super::tools::{call_tool, catalog};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const DISCOVERY_URI: &str = "discovery://info";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

fn error_frame(id: Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message.into() }
    })
}

fn result_frame(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

/// Handle one raw input line. Returns the frame to write back, if any.
pub async fn handle_line(client: &PetClient, line: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(line) {
        Ok(message) => handle_message(client, message).await,
        Err(e) => Some(error_frame(Value::Null, PARSE_ERROR, format!("parse error: {}", e))),
    }
}

/// Handle one decoded JSON-RPC message.
pub async fn handle_message(client: &PetClient, message: Value) -> Option<Value> {
    let id = message.get("id").cloned();
    let method = match message.get("method").and_then(Value::as_str) {
        Some(m) => m.to_string(),
        None => {
            return Some(error_frame(
                id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "missing method",
            ))
        }
    };
    let params = message.get("params").cloned().unwrap_or_else(|| json!({}));
    debug!("rpc {} id={:?}", method, id);

    // Notifications get no reply
    let id = id?;

    let frame = match method.as_str() {
        "initialize" => result_frame(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": { "name": "chickpet-tools", "version": env!("CARGO_PKG_VERSION") },
                "capabilities": { "tools": {}, "resources": {} }
            }),
        ),
        "ping" => result_frame(id, json!({})),
        "tools/list" => result_frame(id, json!({ "tools": catalog() })),
        "tools/call" => {
            let name = match params.get("name").and_then(Value::as_str) {
                Some(n) => n,
                None => return Some(error_frame(id, INVALID_PARAMS, "missing tool name")),
            };
            let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
            match call_tool(client, name, &args).await {
                Ok(reply) => {
                    let mut result = json!({
                        "content": [{ "type": "text", "text": reply.message }],
                        "isError": false
                    });
                    if let Some(data) = reply.data {
                        result["structuredContent"] = data;
                    }
                    result_frame(id, result)
                }
                Err(e) => {
                    warn!("tool {} failed: {}", name, e);
                    result_frame(
                        id,
                        json!({
                            "content": [{ "type": "text", "text": e.to_string() }],
                            "isError": true
                        }),
                    )
                }
            }
        }
        "resources/list" => result_frame(
            id,
            json!({
                "resources": [{
                    "uri": DISCOVERY_URI,
                    "name": "discovery",
                    "mimeType": "application/json"
                }]
            }),
        ),
        "resources/read" => match params.get("uri").and_then(Value::as_str) {
            Some(DISCOVERY_URI) => match client.discovery().await {
                Ok(info) => result_frame(
                    id,
                    json!({
                        "contents": [{
                            "uri": DISCOVERY_URI,
                            "mimeType": "application/json",
                            "text": info.to_string()
                        }]
                    }),
                ),
                Err(e) => error_frame(id, INTERNAL_ERROR, e.to_string()),
            },
            Some(other) => error_frame(id, INVALID_PARAMS, format!("unknown resource: {}", other)),
            None => error_frame(id, INVALID_PARAMS, "missing uri"),
        },
        other => error_frame(id, METHOD_NOT_FOUND, format!("method not found: {}", other)),
    };
    Some(frame)
}

/// Serve JSON-RPC on stdin/stdout until stdin closes.
pub async fn run_stdio(client: PetClient) -> Result<()> {
    info!("Tool adapter ready, forwarding to {}", client.base_url());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(frame) = handle_line(&client, &line).await {
            let mut out = frame.to_string();
            out.push('\n');
            stdout.write_all(out.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    info!("stdin closed, tool adapter exiting");
    Ok(())
}

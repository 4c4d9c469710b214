// MCP server: newline-delimited JSON-RPC 2.0 over stdio

use crate::prompts::PromptRegistry;
use crate::protocol::*;
use crate::tools::ToolRegistry;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub struct McpServer {
    tools: ToolRegistry,
    prompts: PromptRegistry,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(tools: ToolRegistry, prompts: PromptRegistry) -> Self {
        Self {
            tools,
            prompts,
            info: ServerInfo {
                name: "bcrp-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Serve requests on stdin/stdout until stdin closes.
    pub async fn start(&self) -> Result<()> {
        tracing::info!(
            tools = self.tools.len(),
            prompts = self.prompts.list_schemas().len(),
            "MCP server listening on stdio"
        );
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve one request per line from `reader`, writing one response per
    /// line to `writer`. Notifications produce no output.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim()).await,
                Err(err) => {
                    tracing::warn!("Request is not valid UTF-8: {}", err);
                    Some(parse_error_response())
                }
            };

            if let Some(response) = response {
                let payload = serde_json::to_string(&response)?;
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Input closed, MCP server stopping");
        Ok(())
    }

    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(err) => {
                tracing::warn!("Invalid request: {}", err);
                Some(parse_error_response())
            }
        }
    }

    /// Handle a single request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!(method = %request.method, "Request received");

        if request.jsonrpc != "2.0" {
            return request
                .id
                .map(|id| JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        let result = self.dispatch(&request.method, request.params).await;

        let Some(id) = request.id else {
            if let Err(e) = result {
                tracing::debug!(method = %request.method, error = %e.message, "Notification not handled");
            }
            return None;
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    async fn dispatch(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, JsonRpcError> {
        match method {
            "initialize" => {
                let params: InitializeParams = parse_optional_params(params)?;
                if let Some(client) = &params.client_info {
                    tracing::info!(
                        client = %client.name,
                        version = %client.version,
                        protocol = %params.protocol_version,
                        "Client connected"
                    );
                }
                to_value(InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability { list_changed: false }),
                        prompts: Some(PromptsCapability { list_changed: false }),
                    },
                    server_info: self.info.clone(),
                })
            }
            "notifications/initialized" | "initialized" | "notifications/cancelled" => {
                Ok(serde_json::Value::Null)
            }
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => to_value(ListToolsResult {
                tools: self.tools.list_schemas(),
            }),
            "tools/call" => {
                let params: CallToolParams = parse_required_params(method, params)?;
                self.call_tool(params).await
            }
            "prompts/list" => to_value(ListPromptsResult {
                prompts: self.prompts.list_schemas(),
            }),
            "prompts/get" => {
                let params: GetPromptParams = parse_required_params(method, params)?;
                let prompt = self.prompts.get(&params.name).ok_or_else(|| {
                    JsonRpcError::invalid_params(format!("Unknown prompt: {}", params.name))
                })?;
                let result = prompt
                    .get(&params.arguments)
                    .map_err(|e| JsonRpcError::invalid_params(e.to_string()))?;
                to_value(result)
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    async fn call_tool(&self, params: CallToolParams) -> Result<serde_json::Value, JsonRpcError> {
        let tool = self.tools.get(&params.name).ok_or_else(|| {
            JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name))
        })?;

        let result = match tool.execute(params.arguments).await {
            Ok(result) => result,
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::warn!(tool = %params.name, error = %message, "Tool call failed");
                CallToolResult::error(message)
            }
        };
        to_value(result)
    }
}

fn parse_error_response() -> JsonRpcResponse {
    JsonRpcResponse::error(serde_json::Value::Null, JsonRpcError::parse_error())
}

fn to_value(value: impl Serialize) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

fn parse_required_params<T: DeserializeOwned>(
    method: &str,
    params: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    let params = params
        .ok_or_else(|| JsonRpcError::invalid_params(format!("{}: missing params", method)))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("{}: {}", method, e)))
}

fn parse_optional_params<T: DeserializeOwned + Default>(
    params: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    match params {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| JsonRpcError::invalid_params(e.to_string())),
    }
}

// Per-request protocol dispatcher: validates JSON-RPC framing, routes to
// built-in methods or registered tools, and converts every outcome into a
// protocol-compliant transport response.

use crate::protocol::{
    error_codes, Capabilities, CallToolResult, Content, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerInfo, ToolsCapability, MCP_VERSION,
    PROTOCOL_VERSION,
};
use crate::tools::{ToolError, ToolRegistry};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::collections::HashMap;

/// A raw transport request: header map plus body string.
///
/// This is the shape handed over by the hosting transport once the request
/// has cleared the authorization gate.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// The transport response produced for a request
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl GatewayResponse {
    fn json(status: u16, envelope: &JsonRpcResponse) -> Self {
        Self {
            status,
            headers: standard_headers(),
            body: serde_json::to_string(envelope).unwrap_or_default(),
        }
    }

    /// Empty 204 response for notifications
    fn no_content() -> Self {
        Self {
            status: 204,
            headers: standard_headers(),
            body: String::new(),
        }
    }
}

fn standard_headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("MCP-Version".to_string(), MCP_VERSION.to_string()),
    ]
}

/// Stateless request handler owning the read-only tool registry.
///
/// Every request is processed independently; the only state shared across
/// requests is the registry, which is immutable after construction.
pub struct Dispatcher {
    server_name: String,
    server_version: String,
    registry: ToolRegistry,
}

impl Dispatcher {
    pub fn new(
        server_name: impl Into<String>,
        server_version: impl Into<String>,
        registry: ToolRegistry,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            server_version: server_version.into(),
            registry,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one request, start to finish. Never fails: any internal error
    /// escaping the validation pipeline is logged and converted into a
    /// generic server-error response carrying whatever request id was known.
    pub async fn handle(&self, request: &GatewayRequest) -> GatewayResponse {
        let mut request_id = Value::Null;
        match self.process(request, &mut request_id).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("Error processing request: {:#}", err);
                self.error_response(
                    error_codes::SERVER_ERROR,
                    err.to_string(),
                    request_id,
                    None,
                )
            }
        }
    }

    async fn process(
        &self,
        request: &GatewayRequest,
        request_id: &mut Value,
    ) -> Result<GatewayResponse> {
        // Content-type check (header names are case-insensitive)
        let content_type = request
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str());
        if content_type != Some("application/json") {
            return Ok(self.error_response(
                error_codes::PARSE_ERROR,
                "Unsupported Media Type",
                Value::Null,
                None,
            ));
        }

        let body: Value = match serde_json::from_str(&request.body) {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!("Request body is not valid JSON: {}", err);
                return Ok(self.error_response(
                    error_codes::PARSE_ERROR,
                    "Parse error",
                    Value::Null,
                    None,
                ));
            }
        };

        if let Some(object) = body.as_object() {
            match object.get("id") {
                Some(id) => *request_id = id.clone(),
                None => {
                    // A request without an id is a notification and never
                    // receives a JSON-RPC response body
                    tracing::debug!("Request is a notification");
                    return Ok(GatewayResponse::no_content());
                }
            }
        }

        // Basic JSON-RPC envelope shape
        let shape_ok = body.as_object().is_some_and(|object| {
            object.get("jsonrpc").and_then(Value::as_str) == Some("2.0")
                && object.contains_key("method")
        });
        if !shape_ok {
            return Ok(self.error_response(
                error_codes::PARSE_ERROR,
                "Parse error",
                request_id.clone(),
                None,
            ));
        }

        let envelope: JsonRpcRequest =
            serde_json::from_value(body).context("Failed to validate request envelope")?;
        let id = envelope.id.clone().unwrap_or(Value::Null);

        match envelope.method.as_str() {
            "initialize" => {
                tracing::info!("Handling initialize request");
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    server_info: ServerInfo {
                        name: self.server_name.clone(),
                        version: self.server_version.clone(),
                    },
                    capabilities: Capabilities {
                        tools: ToolsCapability {
                            list: true,
                            call: true,
                        },
                    },
                };
                let payload = serde_json::to_value(result)
                    .context("Failed to serialize initialize result")?;
                Ok(self.success_response(payload, id))
            }
            "tools/list" => {
                tracing::info!("Handling tools/list request");
                let payload = serde_json::to_value(ListToolsResult {
                    tools: self.registry.schemas(),
                })
                .context("Failed to serialize tool list")?;
                Ok(self.success_response(payload, id))
            }
            "tools/call" => {
                self.call_tool(envelope.params.unwrap_or_else(|| json!({})), id)
                    .await
            }
            method => Ok(self.error_response(
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
                id,
                None,
            )),
        }
    }

    async fn call_tool(&self, params: Value, id: Value) -> Result<GatewayResponse> {
        let tool_name = params
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let Some(tool) = self.registry.get(&tool_name) else {
            return Ok(self.error_response(
                error_codes::METHOD_NOT_FOUND,
                format!("Tool '{}' not found", tool_name),
                id,
                None,
            ));
        };

        tracing::info!("Handling tools/call request for {}", tool_name);
        match tool.call(arguments).await {
            Ok(result) => {
                let content = vec![Content::text(stringify_result(&result))];
                let payload = serde_json::to_value(CallToolResult { content })
                    .context("Failed to serialize tool result")?;
                Ok(self.success_response(payload, id))
            }
            Err(ToolError::InvalidArguments(message)) => {
                tracing::debug!("Rejected arguments for tool {}: {}", tool_name, message);
                Ok(self.error_response(error_codes::INVALID_PARAMS, message, id, None))
            }
            Err(ToolError::Execution(err)) => {
                tracing::error!("Error executing tool {}: {:#}", tool_name, err);
                let text = err.to_string();
                Ok(self.error_response(
                    error_codes::INTERNAL_ERROR,
                    format!("Error executing tool: {}", text),
                    id,
                    Some(vec![Content::text(text)]),
                ))
            }
        }
    }

    fn success_response(&self, result: Value, id: Value) -> GatewayResponse {
        GatewayResponse::json(200, &JsonRpcResponse::success(id, result))
    }

    fn error_response(
        &self,
        code: i64,
        message: impl Into<String>,
        id: Value,
        error_content: Option<Vec<Content>>,
    ) -> GatewayResponse {
        let error = JsonRpcError::new(code, message);
        let status = error.http_status();
        GatewayResponse::json(status, &JsonRpcResponse::error(id, error, error_content))
    }
}

/// Render a tool result as the text of a single content item: strings are
/// used as-is, everything else serializes as compact JSON
fn stringify_result(result: &Value) -> String {
    match result {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ParamKind, ToolSpec};
    use crate::tools::{bind_arguments, Tool};
    use anyhow::anyhow;
    use serde::Deserialize;
    use std::sync::Arc;

    struct GreetTool;

    #[async_trait::async_trait]
    impl Tool for GreetTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new(
                "hello_world",
                "A simple hello world tool.\n\nArgs:\n    name: Name to greet",
            )
            .param("name", ParamKind::Text)
        }

        async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
            #[derive(Deserialize)]
            struct Args {
                name: String,
            }
            let args: Args = bind_arguments("helloWorld", arguments)?;
            Ok(json!(format!("Hello, {}!", args.name)))
        }
    }

    struct CountTool;

    #[async_trait::async_trait]
    impl Tool for CountTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("count_widgets", "Count the widgets.")
        }

        async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
            Ok(json!(3))
        }
    }

    struct ExplodingTool;

    #[async_trait::async_trait]
    impl Tool for ExplodingTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("broken_tool", "Always fails.")
        }

        async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
            Err(ToolError::Execution(anyhow!("widget overflow")))
        }
    }

    fn test_dispatcher() -> Dispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(GreetTool)).unwrap();
        registry.register(Arc::new(CountTool)).unwrap();
        registry.register(Arc::new(ExplodingTool)).unwrap();
        Dispatcher::new("test-server", "1.0.0", registry)
    }

    fn json_request(body: &str) -> GatewayRequest {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        GatewayRequest {
            headers,
            body: body.to_string(),
        }
    }

    fn body_json(response: &GatewayResponse) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize"}"#,
            ))
            .await;

        assert_eq!(response.status, 200);
        let body = body_json(&response);
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(body["result"]["serverInfo"]["name"], "test-server");
        assert_eq!(body["result"]["serverInfo"]["version"], "1.0.0");
        assert_eq!(
            body["result"]["capabilities"]["tools"],
            json!({"list": true, "call": true})
        );
    }

    #[tokio::test]
    async fn test_tools_list_in_registration_order() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 2, "method": "tools/list"}"#,
            ))
            .await;

        assert_eq!(response.status, 200);
        let body = body_json(&response);
        let tools = body["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["helloWorld", "countWidgets", "brokenTool"]);

        // Every schema carries name, description, and an inputSchema with
        // all declared parameters required
        let hello = &tools[0];
        assert_eq!(hello["description"], "A simple hello world tool.");
        assert_eq!(hello["inputSchema"]["type"], "object");
        assert_eq!(hello["inputSchema"]["required"], json!(["name"]));
        assert_eq!(
            hello["inputSchema"]["properties"]["name"]["description"],
            "Name to greet"
        );
    }

    #[tokio::test]
    async fn test_tools_list_is_idempotent() {
        let dispatcher = test_dispatcher();
        let request = json_request(r#"{"jsonrpc": "2.0", "id": 3, "method": "tools/list"}"#);

        let first = dispatcher.handle(&request).await;
        let second = dispatcher.handle(&request).await;
        assert_eq!(first.body, second.body);
    }

    #[tokio::test]
    async fn test_tool_call_success() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 4, "method": "tools/call",
                    "params": {"name": "helloWorld", "arguments": {"name": "World"}}}"#,
            ))
            .await;

        assert_eq!(response.status, 200);
        let body = body_json(&response);
        assert_eq!(
            body["result"]["content"],
            json!([{"type": "text", "text": "Hello, World!"}])
        );
    }

    #[tokio::test]
    async fn test_tool_call_stringifies_non_string_results() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 5, "method": "tools/call",
                    "params": {"name": "countWidgets"}}"#,
            ))
            .await;

        let body = body_json(&response);
        // Non-string results render as compact JSON, strings stay bare
        assert_eq!(body["result"]["content"][0]["text"], "3");
    }

    #[tokio::test]
    async fn test_tool_call_unknown_tool() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 6, "method": "tools/call",
                    "params": {"name": "doesNotExist"}}"#,
            ))
            .await;

        assert_eq!(response.status, 404);
        let body = body_json(&response);
        assert_eq!(body["id"], 6);
        assert_eq!(body["error"]["code"], -32601);
        assert_eq!(body["error"]["message"], "Tool 'doesNotExist' not found");
    }

    #[tokio::test]
    async fn test_tool_call_execution_failure() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 7, "method": "tools/call",
                    "params": {"name": "brokenTool"}}"#,
            ))
            .await;

        assert_eq!(response.status, 500);
        let body = body_json(&response);
        assert_eq!(body["id"], 7);
        assert_eq!(body["error"]["code"], -32603);
        assert_eq!(
            body["error"]["message"],
            "Error executing tool: widget overflow"
        );
        assert_eq!(
            body["errorContent"],
            json!([{"type": "text", "text": "widget overflow"}])
        );
    }

    #[tokio::test]
    async fn test_tool_call_invalid_arguments() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 8, "method": "tools/call",
                    "params": {"name": "helloWorld", "arguments": {"name": 42}}}"#,
            ))
            .await;

        assert_eq!(response.status, 400);
        let body = body_json(&response);
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 9, "method": "resources/list"}"#,
            ))
            .await;

        assert_eq!(response.status, 404);
        let body = body_json(&response);
        assert_eq!(body["error"]["code"], -32601);
        assert_eq!(body["error"]["message"], "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_notification_gets_no_body() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#,
            ))
            .await;

        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
        // Protocol headers are still present on the empty response
        assert!(response
            .headers
            .iter()
            .any(|(name, value)| name == "MCP-Version" && value == "0.6"));
    }

    #[tokio::test]
    async fn test_notification_ignores_method_value() {
        let dispatcher = test_dispatcher();
        // Even an unknown method is not an error when there is no id
        let response = dispatcher
            .handle(&json_request(r#"{"jsonrpc": "2.0", "method": "bogus"}"#))
            .await;
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let dispatcher = test_dispatcher();
        let response = dispatcher.handle(&json_request("{not json")).await;

        assert_eq!(response.status, 400);
        let body = body_json(&response);
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["error"]["message"], "Parse error");
    }

    #[tokio::test]
    async fn test_wrong_content_type() {
        let dispatcher = test_dispatcher();
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        let response = dispatcher
            .handle(&GatewayRequest {
                headers,
                body: r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize"}"#.to_string(),
            })
            .await;

        assert_eq!(response.status, 400);
        let body = body_json(&response);
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["error"]["message"], "Unsupported Media Type");
    }

    #[tokio::test]
    async fn test_content_type_header_is_case_insensitive() {
        let dispatcher = test_dispatcher();
        let mut headers = HashMap::new();
        headers.insert("CONTENT-TYPE".to_string(), "application/json".to_string());
        let response = dispatcher
            .handle(&GatewayRequest {
                headers,
                body: r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize"}"#.to_string(),
            })
            .await;

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version_echoes_id() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "1.0", "id": 10, "method": "initialize"}"#,
            ))
            .await;

        assert_eq!(response.status, 400);
        let body = body_json(&response);
        assert_eq!(body["id"], 10);
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["error"]["message"], "Parse error");
    }

    #[tokio::test]
    async fn test_missing_method_is_a_parse_error() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(r#"{"jsonrpc": "2.0", "id": 11}"#))
            .await;

        assert_eq!(response.status, 400);
        let body = body_json(&response);
        assert_eq!(body["id"], 11);
        assert_eq!(body["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_non_object_body_is_a_parse_error() {
        let dispatcher = test_dispatcher();
        let response = dispatcher.handle(&json_request("[1, 2, 3]")).await;

        assert_eq!(response.status, 400);
        let body = body_json(&response);
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_invalid_envelope_field_type_is_a_server_error() {
        let dispatcher = test_dispatcher();
        // Shape check passes (jsonrpc + method present) but the envelope
        // fails structural validation: method must be a string
        let response = dispatcher
            .handle(&json_request(r#"{"jsonrpc": "2.0", "id": 12, "method": 5}"#))
            .await;

        assert_eq!(response.status, 500);
        let body = body_json(&response);
        assert_eq!(body["id"], 12);
        assert_eq!(body["error"]["code"], -32000);
    }

    #[tokio::test]
    async fn test_tools_call_without_params_reports_unknown_tool() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 13, "method": "tools/call"}"#,
            ))
            .await;

        assert_eq!(response.status, 404);
        let body = body_json(&response);
        assert_eq!(body["error"]["code"], -32601);
        assert_eq!(body["error"]["message"], "Tool '' not found");
    }

    #[tokio::test]
    async fn test_responses_carry_protocol_headers() {
        let dispatcher = test_dispatcher();
        let response = dispatcher
            .handle(&json_request(
                r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize"}"#,
            ))
            .await;

        assert!(response
            .headers
            .iter()
            .any(|(name, value)| name == "Content-Type" && value == "application/json"));
        assert!(response
            .headers
            .iter()
            .any(|(name, value)| name == "MCP-Version" && value == "0.6"));
    }
}

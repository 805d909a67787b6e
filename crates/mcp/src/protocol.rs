// MCP protocol types (JSON-RPC 2.0 over single-shot HTTP requests)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision reported by the initialize handshake
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Value of the MCP-Version response header
pub const MCP_VERSION: &str = "0.6";

/// JSON-RPC error codes used on the wire
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const SERVER_ERROR: i64 = -32000;
}

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 Response.
///
/// `error_content` is a top-level field of the wire envelope (not nested
/// inside `error`), carried only for tool-execution failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(rename = "errorContent", skip_serializing_if = "Option::is_none")]
    pub error_content: Option<Vec<Content>>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
            error_content: None,
        }
    }

    pub fn error(id: Value, error: JsonRpcError, error_content: Option<Vec<Content>>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
            error_content,
        }
    }
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Map a JSON-RPC error code to the transport status code
    pub fn http_status(&self) -> u16 {
        match self.code {
            error_codes::PARSE_ERROR => 400,
            error_codes::INVALID_REQUEST => 400,
            error_codes::METHOD_NOT_FOUND => 404,
            error_codes::INVALID_PARAMS => 400,
            error_codes::INTERNAL_ERROR => 500,
            _ => 500,
        }
    }
}

/// A single content item in a tool result or error body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Result payload for tools/call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
}

/// Result payload for tools/list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolSchema>,
}

/// Machine-readable description of a registered tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: InputSchema,
}

/// JSON-schema-shaped parameter object for a tool.
///
/// Property order follows the tool's declared parameter order, and every
/// declared parameter appears in `required`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub object_type: String,
    pub properties: serde_json::Map<String, Value>,
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn object(properties: serde_json::Map<String, Value>, required: Vec<String>) -> Self {
        Self {
            object_type: "object".to_string(),
            properties,
            required,
        }
    }
}

/// Initialize handshake result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCapability {
    pub list: bool,
    pub call: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_omits_absent_fields() {
        let response = JsonRpcResponse::success(json!(1), json!({"ok": true}));
        let wire = serde_json::to_value(&response).unwrap();

        assert_eq!(wire["jsonrpc"], "2.0");
        assert_eq!(wire["id"], 1);
        assert_eq!(wire["result"], json!({"ok": true}));
        assert!(wire.get("error").is_none());
        assert!(wire.get("errorContent").is_none());
    }

    #[test]
    fn test_error_response_with_content() {
        let response = JsonRpcResponse::error(
            json!("req-1"),
            JsonRpcError::new(error_codes::INTERNAL_ERROR, "Error executing tool: boom"),
            Some(vec![Content::text("boom")]),
        );
        let wire = serde_json::to_value(&response).unwrap();

        assert_eq!(wire["error"]["code"], -32603);
        assert_eq!(wire["errorContent"], json!([{"type": "text", "text": "boom"}]));
        assert!(wire.get("result").is_none());
    }

    #[test]
    fn test_http_status_mapping() {
        let status = |code| JsonRpcError::new(code, "").http_status();
        assert_eq!(status(error_codes::PARSE_ERROR), 400);
        assert_eq!(status(error_codes::INVALID_REQUEST), 400);
        assert_eq!(status(error_codes::METHOD_NOT_FOUND), 404);
        assert_eq!(status(error_codes::INVALID_PARAMS), 400);
        assert_eq!(status(error_codes::INTERNAL_ERROR), 500);
        // Unmapped codes fall back to 500
        assert_eq!(status(error_codes::SERVER_ERROR), 500);
        assert_eq!(status(-1), 500);
    }

    #[test]
    fn test_content_wire_shape() {
        let content = Content::text("hello");
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({"type": "text", "text": "hello"})
        );
    }
}

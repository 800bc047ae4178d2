//! MCP protocol response helpers.

use rmcp::model::{CallToolResult, Content};
use rmcp::schemars::{self, JsonSchema};
use rmcp::ErrorData as McpError;
use serde::{Deserialize, Serialize};

use crate::services::{Page, PageInfo};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// JSON format (default).
    #[default]
    Json,
    /// TOON (Token-Oriented Object Notation) - 40-60% fewer tokens.
    Toon,
}

/// The `{success, message, data}` body every tool returns.
///
/// Paginated listings also carry `pagination`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            pagination: None,
        }
    }

    /// An envelope reporting that the operation had no effect.
    pub fn failed(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            ..Self::ok(message, data)
        }
    }

    pub fn with_pagination(mut self, pagination: PageInfo) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl<T> Envelope<Vec<T>> {
    /// Slices `items` to `page` and attaches the pagination metadata.
    pub fn paginated(message: impl Into<String>, items: Vec<T>, page: Page) -> Self {
        let (data, info) = page.apply(items);
        Self::ok(message, data).with_pagination(info)
    }
}

/// An envelope plus the format it should be rendered in.
///
/// ```ignore
/// Response(Envelope::ok("Product found", product), None).into()
/// Response(envelope, Some(OutputFormat::Toon)).into()
/// ```
pub struct Response<T>(pub Envelope<T>, pub Option<OutputFormat>);

impl<T> Response<T> {
    pub fn json(envelope: Envelope<T>) -> Self {
        Response(envelope, None)
    }
}

impl<T: Serialize> Response<T> {
    fn render(self) -> Result<CallToolResult, McpError> {
        let Response(envelope, format) = self;
        let success = envelope.success;

        let content = match format.unwrap_or_default() {
            OutputFormat::Json => {
                let value = serde_json::to_value(&envelope).map_err(|e| {
                    McpError::internal_error(format!("failed to serialize response: {}", e), None)
                })?;
                Content::json(value)?
            }
            OutputFormat::Toon => {
                let toon = serde_toon::to_string(&envelope)
                    .unwrap_or_else(|e| format!("TOON serialization error: {}", e));
                Content::text(toon)
            }
        };

        Ok(if success {
            CallToolResult::success(vec![content])
        } else {
            CallToolResult::error(vec![content])
        })
    }
}

impl<T: Serialize> From<Response<T>> for Result<CallToolResult, McpError> {
    fn from(response: Response<T>) -> Self {
        response.render()
    }
}

impl<T: Serialize> From<Envelope<T>> for Result<CallToolResult, McpError> {
    fn from(envelope: Envelope<T>) -> Self {
        Response::json(envelope).render()
    }
}

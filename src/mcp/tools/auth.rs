//! Authentication tool - exchanges credentials for a bearer token.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::mcp::protocol::Envelope;
use crate::mcp::server::McpServer;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AuthenticateParams {
    pub username: String,
    pub password: String,
}

#[tool_router(router = auth_tools, vis = "pub(crate)")]
impl McpServer {
    /// Not gated: this is how a caller obtains a token in the first place.
    #[tool(
        description = "Authenticate with username and password. Returns a bearer token for the write tools."
    )]
    pub async fn authenticate_user(
        &self,
        Parameters(params): Parameters<AuthenticateParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(username = %params.username, "Running authenticate_user tool");

        // bcrypt is CPU-bound; keep it off the async workers.
        let auth = self.ctx.auth.clone();
        let username = params.username.clone();
        let token = tokio::task::spawn_blocking(move || auth.authenticate(&username, &params.password))
            .await
            .map_err(|e| AppError::Internal(format!("authentication task failed: {}", e)))?
            .inspect_err(|_| tracing::warn!(username = %params.username, "Authentication failed"))?;

        Envelope::ok(
            format!("User '{}' authenticated successfully", token.username),
            token,
        )
        .into()
    }
}

//! MCP server command handler.

use color_eyre::Result;
use rmcp::ServiceExt;

use crate::config::Config;
use crate::context::Context;
use crate::mcp::McpServer;

use super::App;

impl App {
    /// Run the MCP server with stdio transport.
    ///
    /// A `--token` is validated here once; a bad token aborts startup instead
    /// of failing every gated call later.
    pub async fn run_mcp(&self, token: Option<String>) -> Result<()> {
        tracing::info!("Starting ontograph MCP server");

        let config = Config::load()?;
        let ctx = Context::from_config(config).await?;

        if let Some(token) = token.as_deref() {
            let identity = ctx.auth.validate(token)?;
            tracing::info!(
                user = %identity.username,
                expires_at = %identity.expires_at,
                "Session authenticated"
            );
        } else if ctx.auth.enabled() {
            tracing::warn!("No session token; write tools will be rejected");
        }

        let server = McpServer::new(ctx).with_session_token(token);

        let service = server.serve(rmcp::transport::stdio()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to start MCP server");
            color_eyre::eyre::eyre!("Failed to start MCP server: {}", e)
        })?;

        tracing::info!("MCP server started, waiting for connections");

        service.waiting().await.map_err(|e| {
            tracing::error!(error = %e, "MCP server error");
            color_eyre::eyre::eyre!("MCP server error: {}", e)
        })?;

        tracing::info!("MCP server shutting down");
        Ok(())
    }
}

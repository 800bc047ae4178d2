//! HTTP server command handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use color_eyre::Result;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde_json::json;
use tower::ServiceBuilder;

use crate::auth::{bearer_token, AuthGate};
use crate::config::Config;
use crate::context::Context;
use crate::mcp::McpServer;

use super::App;

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(json!({"success": false, "message": message})),
    )
        .into_response()
}

/// Bearer authentication in front of the MCP endpoint.
///
/// A request without a token passes through anonymously so read tools keep
/// working; write tools reject it. A presented token must be well formed and
/// valid, and its identity is attached to the request.
pub(crate) async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    mut req: Request,
    next: Next,
) -> Response {
    if !gate.enabled() {
        return next.run(req).await;
    }

    let header_value = match req.headers().get(header::AUTHORIZATION) {
        None => return next.run(req).await,
        Some(value) => value.to_str().ok(),
    };

    let Some(token) = header_value.and_then(bearer_token) else {
        tracing::warn!("Malformed Authorization header");
        return unauthorized("malformed Authorization header");
    };

    match gate.validate(token) {
        Ok(identity) => {
            tracing::debug!(user = %identity.username, "Bearer token accepted");
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Bearer token rejected");
            unauthorized(&e.to_string())
        }
    }
}

/// Routes the MCP service behind the bearer middleware.
pub(crate) fn router(ctx: Arc<Context>) -> Router {
    let gate = ctx.auth.clone();

    let service = StreamableHttpService::new(
        move || Ok(McpServer::from_arc(ctx.clone())),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .fallback_service(ServiceBuilder::new().service(service))
        .layer(middleware::from_fn_with_state(gate, auth_middleware))
}

impl App {
    /// Run the MCP server with HTTP transport.
    pub async fn run_serve(&self, host: Option<String>, port: Option<u16>) -> Result<()> {
        tracing::info!("Starting ontograph HTTP server");

        let mut config = Config::load()?;
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }
        config.server.transport = crate::config::Transport::Http;

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                color_eyre::eyre::eyre!(
                    "Invalid address {}:{}: {}",
                    config.server.host,
                    config.server.port,
                    e
                )
            })?;

        let ctx = Arc::new(Context::from_config(config).await?);
        if ctx.auth.enabled() {
            tracing::info!("Bearer authentication enabled");
        } else {
            tracing::warn!("Authentication disabled - server is unprotected!");
        }

        let app = router(ctx);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to bind to {}: {}", addr, e))?;

        tracing::info!("ontograph HTTP server listening on http://{}", addr);

        axum::serve(listener, app).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            color_eyre::eyre::eyre!("HTTP server error: {}", e)
        })?;

        tracing::info!("HTTP server shutting down");
        Ok(())
    }
}

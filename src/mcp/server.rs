//! MCP server implementation for ontograph.

use std::sync::Arc;

use axum::http::request::Parts;
use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler},
    model::{
        Implementation, ListResourcesResult, PaginatedRequestParam, ProtocolVersion,
        ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool_handler, ErrorData as McpError,
};

use crate::auth::Identity;
use crate::context::Context;
use crate::di::FromRef;
use crate::error::AppError;

use super::resources;

/// Product ontology MCP server.
///
/// This server provides AI assistants with tools to:
/// - Register and query products, functionalities and components
/// - Record incidents against functionalities and their resolutions
/// - Exchange credentials for a bearer token
#[derive(Clone)]
pub struct McpServer {
    pub(crate) ctx: Arc<Context>,
    tool_router: ToolRouter<McpServer>,
    /// Token given at stdio startup; HTTP requests carry their own.
    session_token: Option<String>,
}

impl McpServer {
    pub fn new(ctx: Context) -> Self {
        Self::from_arc(Arc::new(ctx))
    }

    /// Shares one context across HTTP sessions.
    pub fn from_arc(ctx: Arc<Context>) -> Self {
        tracing::debug!("Initializing MCP server session");

        Self {
            ctx,
            tool_router: Self::tool_router(),
            session_token: None,
        }
    }

    /// Attaches the token presented once at startup of a stdio session.
    pub fn with_session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    /// Build the combined tool router from all tool modules.
    fn tool_router() -> ToolRouter<Self> {
        Self::product_tools()
            + Self::functionality_tools()
            + Self::incident_tools()
            + Self::auth_tools()
    }

    /// Resolve a dependency from the context.
    pub fn resolve<T: FromRef<Context>>(&self) -> T {
        T::from_ref(&self.ctx)
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Identity the HTTP middleware attached to this request, if any.
    fn attached_identity(request: &RequestContext<RoleServer>) -> Option<Identity> {
        request
            .extensions
            .get::<Parts>()
            .and_then(|parts| parts.extensions.get::<Identity>())
            .cloned()
    }

    /// Gate for mutating tools.
    pub(crate) fn require_identity(
        &self,
        request: &RequestContext<RoleServer>,
    ) -> Result<Option<Identity>, AppError> {
        if let Some(identity) = Self::attached_identity(request) {
            return Ok(Some(identity));
        }
        self.ctx.auth.require(self.session_token.as_deref())
    }

    /// Gate for read tools; never fails.
    pub(crate) fn optional_identity(
        &self,
        request: &RequestContext<RoleServer>,
    ) -> Option<Identity> {
        Self::attached_identity(request)
            .or_else(|| self.ctx.auth.optional(self.session_token.as_deref()))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"Product Management MCP Server

An ontology of products, the functionalities they expose, the components
that implement them, and the incidents raised against functionalities.

## Authentication

- **authenticate_user** - Exchange username/password for a bearer token
- Write tools require the token; read tools accept it optionally

## Product Tools

- **register_product** - Create or update a product, optionally assigning functionalities
- **get_product_details** - Product with functionalities, incidents and resolutions
- **update_product** - Change a product's name
- **delete_product** - Delete a product and its assignments
- **list_products** - Paginated product listing
- **search_products** - Case-insensitive search on code and name

## Functionality Tools

- **register_functionality** - Create or update a functionality
- **get_functionality_details** - Functionality with products, components and incidents
- **list_functionalities** - Paginated functionality listing
- **assign_functionalities_to_product** - Assign several functionalities at once
- **remove_functionalities_from_product** - Remove several assignments at once

## Incident Tools

- **register_incident** - Record an incident (SLA_CRITICAL, SLA_HIGH, SLA_MEDIUM, SLA_LOW)
- **register_resolution** - Record how an incident was resolved
- **get_incident_details** - Incident with its resolution
- **list_incidents_by_functionality** - Incidents of one functionality
- **list_incidents_by_product** - Incidents across a product's functionalities

## Resources

products://{limit}_{offset}, product://{code}, functionalities://{limit}_{offset},
search://{query}, schema://{product|functionality|ontology}, server://info
"#
                .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(resources::catalog()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        resources::read(self, &request.uri).await
    }
}

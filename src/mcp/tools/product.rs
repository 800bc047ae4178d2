//! Product tools - registration, details, update, deletion and listing.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    service::{RequestContext, RoleServer},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::mcp::protocol::{Envelope, OutputFormat, Response};
use crate::mcp::server::McpServer;
use crate::models::{Functionality, Incident, Product, ProductUpdate, Resolution, UpdateOutcome};
use crate::services::{BulkOutcome, OntologyManager, Page};

const DEFAULT_SEARCH_LIMIT: i64 = 10;

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterProductParams {
    /// Unique product code, e.g. "ERP".
    pub code: String,
    /// Human-readable product name.
    pub name: String,
    /// Functionality codes to assign right away. Unknown codes are reported,
    /// not fatal.
    #[serde(default)]
    pub functionalities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProductCodeParams {
    /// Product code.
    pub code: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateProductParams {
    /// Product code.
    pub code: String,
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListParams {
    /// Page size, 1 to 1000 (default 50).
    #[serde(default)]
    pub limit: Option<i64>,
    /// Items to skip (default 0).
    #[serde(default)]
    pub offset: Option<i64>,
    /// Output format: "json" (default) or "toon".
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Case-insensitive text matched against code and name.
    pub query: String,
    /// Maximum results, 1 to 1000 (default 10).
    #[serde(default)]
    pub limit: Option<i64>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RegisterProductResult {
    pub product: Product,
    pub assigned_functionalities: Vec<String>,
    pub failed_functionalities: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailsResult {
    pub product: Product,
    pub functionalities: Vec<Functionality>,
    pub functionality_count: usize,
    pub incidents: Vec<Incident>,
    pub incident_count: usize,
    pub resolutions: Vec<Resolution>,
    pub resolution_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteProductResult {
    pub deleted_product: String,
}

#[derive(Debug, Serialize)]
pub struct SearchProductsResult {
    pub products: Vec<Product>,
    pub total: usize,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = product_tools, vis = "pub(crate)")]
impl McpServer {
    #[tool(
        description = "Register a product (upsert by code). Optionally assigns functionality codes; unknown ones are listed as failed. Requires authentication."
    )]
    pub async fn register_product(
        &self,
        Parameters(params): Parameters<RegisterProductParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.require_identity(&request)?.map(|i| i.username);
        tracing::info!(code = %params.code, caller = ?caller, "Running register_product tool");

        let manager = self.resolve::<OntologyManager>();
        let product = manager.create_product(&params.code, &params.name).await?;

        let requested = params.functionalities.unwrap_or_default();
        let outcome = if requested.is_empty() {
            BulkOutcome::default()
        } else {
            manager
                .assign_functionalities_to_product(&product.code, &requested)
                .await?
        };
        for failure in &outcome.failed {
            tracing::warn!(
                functionality = %failure.functionality_code,
                reason = %failure.reason,
                "Functionality not assigned"
            );
        }
        let assigned = outcome.successful;
        let failed = outcome
            .failed
            .into_iter()
            .map(|f| f.functionality_code)
            .collect();

        Envelope::ok(
            format!("Product '{}' registered successfully", product.code),
            RegisterProductResult {
                product,
                assigned_functionalities: assigned,
                failed_functionalities: failed,
            },
        )
        .into()
    }

    #[tool(
        description = "Get a product with its functionalities, the incidents raised against them and their resolutions."
    )]
    pub async fn get_product_details(
        &self,
        Parameters(params): Parameters<ProductCodeParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.optional_identity(&request).map(|i| i.username);
        tracing::info!(code = %params.code, caller = ?caller, "Running get_product_details tool");

        let details = self
            .resolve::<OntologyManager>()
            .get_product_with_functionalities(&params.code)
            .await?
            .ok_or_else(|| AppError::not_found("Product", &params.code))?;

        Envelope::ok(
            format!("Product '{}' retrieved", details.product.code),
            ProductDetailsResult {
                functionality_count: details.functionalities.len(),
                incident_count: details.incidents.len(),
                resolution_count: details.resolutions.len(),
                product: details.product,
                functionalities: details.functionalities,
                incidents: details.incidents,
                resolutions: details.resolutions,
            },
        )
        .into()
    }

    #[tool(description = "Update a product's name. Requires authentication.")]
    pub async fn update_product(
        &self,
        Parameters(params): Parameters<UpdateProductParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.require_identity(&request)?.map(|i| i.username);
        tracing::info!(code = %params.code, caller = ?caller, "Running update_product tool");

        let update = ProductUpdate {
            name: params.name.filter(|n| !n.trim().is_empty()),
        };

        let manager = self.resolve::<OntologyManager>();
        manager.require_product(&params.code).await?;

        match manager.update_product(&params.code, update).await? {
            UpdateOutcome::Updated(product) => Envelope::ok(
                format!("Product '{}' updated successfully", product.code),
                product,
            )
            .into(),
            UpdateOutcome::NoChanges => {
                Err(AppError::Validation("No updates provided".into()).into())
            }
        }
    }

    #[tool(
        description = "Delete a product and all of its functionality assignments. Requires authentication."
    )]
    pub async fn delete_product(
        &self,
        Parameters(params): Parameters<ProductCodeParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.require_identity(&request)?.map(|i| i.username);
        tracing::info!(code = %params.code, caller = ?caller, "Running delete_product tool");

        if !self
            .resolve::<OntologyManager>()
            .delete_product(&params.code)
            .await?
        {
            return Err(AppError::not_found("Product", &params.code).into());
        }

        Envelope::ok(
            format!("Product '{}' deleted successfully", params.code),
            DeleteProductResult {
                deleted_product: params.code,
            },
        )
        .into()
    }

    #[tool(
        description = "List products ordered by code. Paginated with limit (1-1000, default 50) and offset."
    )]
    pub async fn list_products(
        &self,
        Parameters(params): Parameters<ListParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.optional_identity(&request).map(|i| i.username);
        tracing::info!(caller = ?caller, "Running list_products tool");
        let page = Page::new(params.limit, params.offset)?;

        let products = self.resolve::<OntologyManager>().list_products().await?;
        let envelope = Envelope::paginated("Products retrieved", products, page);

        tracing::debug!(returned = envelope.data.len(), "Listed products");
        Response(envelope, params.format).into()
    }

    #[tool(description = "Search products by code or name (case-insensitive substring).")]
    pub async fn search_products(
        &self,
        Parameters(params): Parameters<SearchParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.optional_identity(&request).map(|i| i.username);
        tracing::info!(query = %params.query, caller = ?caller, "Running search_products tool");
        let page = Page::new(Some(params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)), None)?;

        let products = self
            .resolve::<OntologyManager>()
            .search_products(&params.query, page.limit)
            .await?;

        Envelope::ok(
            format!("Found {} products matching '{}'", products.len(), params.query),
            SearchProductsResult {
                total: products.len(),
                products,
            },
        )
        .into()
    }
}

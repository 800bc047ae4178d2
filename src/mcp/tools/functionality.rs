//! Functionality tools - registration, details, listing and bulk assignment.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    service::{RequestContext, RoleServer},
    tool, tool_router, ErrorData as McpError,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::mcp::protocol::{Envelope, Response};
use crate::mcp::server::McpServer;
use crate::mcp::tools::product::ListParams;
use crate::models::{Component, Functionality, Incident, Product, Resolution};
use crate::services::{BulkFailure, BulkOutcome, OntologyManager, Page};

// ============================================================================
// Parameter Types
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterFunctionalityParams {
    /// Unique functionality code, e.g. "AUTENTICACION".
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FunctionalityCodeParams {
    /// Functionality code.
    pub code: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BulkAssignmentParams {
    /// Product code.
    pub product_code: String,
    /// Functionality codes to assign or remove.
    pub functionality_codes: Vec<String>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FunctionalityDetailsResult {
    pub functionality: Functionality,
    pub products: Vec<Product>,
    pub product_count: usize,
    pub components: Vec<Component>,
    pub component_count: usize,
    pub incidents: Vec<Incident>,
    pub incident_count: usize,
    pub resolutions: Vec<Resolution>,
    pub resolution_count: usize,
}

#[derive(Debug, Serialize)]
pub struct BulkSummary {
    pub total_requested: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResult {
    pub product_code: String,
    pub successful_assignments: Vec<String>,
    pub failed_assignments: Vec<BulkFailure>,
    pub summary: BulkSummary,
}

#[derive(Debug, Serialize)]
pub struct RemovalResult {
    pub product_code: String,
    pub successful_removals: Vec<String>,
    pub failed_removals: Vec<BulkFailure>,
    pub summary: BulkSummary,
}

impl From<&BulkOutcome> for BulkSummary {
    fn from(outcome: &BulkOutcome) -> Self {
        Self {
            total_requested: outcome.requested(),
            successful: outcome.successful.len(),
            failed: outcome.failed.len(),
        }
    }
}

impl AssignmentResult {
    fn new(product_code: String, outcome: BulkOutcome) -> Self {
        Self {
            product_code,
            summary: BulkSummary::from(&outcome),
            successful_assignments: outcome.successful,
            failed_assignments: outcome.failed,
        }
    }

    fn into_envelope(self) -> Envelope<Self> {
        let message = format!(
            "Assigned {} of {} functionalities to '{}'",
            self.summary.successful, self.summary.total_requested, self.product_code
        );
        if self.summary.successful > 0 {
            Envelope::ok(message, self)
        } else {
            Envelope::failed(message, self)
        }
    }
}

impl RemovalResult {
    fn new(product_code: String, outcome: BulkOutcome) -> Self {
        Self {
            product_code,
            summary: BulkSummary::from(&outcome),
            successful_removals: outcome.successful,
            failed_removals: outcome.failed,
        }
    }

    fn into_envelope(self) -> Envelope<Self> {
        let message = format!(
            "Removed {} of {} functionalities from '{}'",
            self.summary.successful, self.summary.total_requested, self.product_code
        );
        if self.summary.successful > 0 {
            Envelope::ok(message, self)
        } else {
            Envelope::failed(message, self)
        }
    }
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = functionality_tools, vis = "pub(crate)")]
impl McpServer {
    #[tool(description = "Register a functionality (upsert by code). Requires authentication.")]
    pub async fn register_functionality(
        &self,
        Parameters(params): Parameters<RegisterFunctionalityParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.require_identity(&request)?.map(|i| i.username);
        tracing::info!(code = %params.code, caller = ?caller, "Running register_functionality tool");

        let functionality = self
            .resolve::<OntologyManager>()
            .create_functionality(&params.code, &params.name)
            .await?;

        Envelope::ok(
            format!("Functionality '{}' registered successfully", functionality.code),
            functionality,
        )
        .into()
    }

    #[tool(
        description = "Get a functionality with the products and components using it, its incidents and their resolutions."
    )]
    pub async fn get_functionality_details(
        &self,
        Parameters(params): Parameters<FunctionalityCodeParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.optional_identity(&request).map(|i| i.username);
        tracing::info!(code = %params.code, caller = ?caller, "Running get_functionality_details tool");

        let details = self
            .resolve::<OntologyManager>()
            .get_functionality_with_products(&params.code)
            .await?
            .ok_or_else(|| AppError::not_found("Functionality", &params.code))?;

        Envelope::ok(
            format!("Functionality '{}' retrieved", details.functionality.code),
            FunctionalityDetailsResult {
                product_count: details.products.len(),
                component_count: details.components.len(),
                incident_count: details.incidents.len(),
                resolution_count: details.resolutions.len(),
                functionality: details.functionality,
                products: details.products,
                components: details.components,
                incidents: details.incidents,
                resolutions: details.resolutions,
            },
        )
        .into()
    }

    #[tool(
        description = "List functionalities ordered by code. Paginated with limit (1-1000, default 50) and offset."
    )]
    pub async fn list_functionalities(
        &self,
        Parameters(params): Parameters<ListParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.optional_identity(&request).map(|i| i.username);
        tracing::info!(caller = ?caller, "Running list_functionalities tool");
        let page = Page::new(params.limit, params.offset)?;

        let functionalities = self
            .resolve::<OntologyManager>()
            .list_functionalities()
            .await?;

        Response(
            Envelope::paginated("Functionalities retrieved", functionalities, page),
            params.format,
        )
        .into()
    }

    #[tool(
        description = "Assign several functionalities to a product. Reports each failure; succeeds if at least one assignment was made. Requires authentication."
    )]
    pub async fn assign_functionalities_to_product(
        &self,
        Parameters(params): Parameters<BulkAssignmentParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.require_identity(&request)?.map(|i| i.username);
        tracing::info!(
            product = %params.product_code,
            requested = params.functionality_codes.len(),
            caller = ?caller,
            "Running assign_functionalities_to_product tool"
        );

        let outcome = self
            .resolve::<OntologyManager>()
            .assign_functionalities_to_product(&params.product_code, &params.functionality_codes)
            .await?;

        AssignmentResult::new(params.product_code, outcome)
            .into_envelope()
            .into()
    }

    #[tool(
        description = "Remove several functionalities from a product. Pairs that were never assigned are reported as failed. Requires authentication."
    )]
    pub async fn remove_functionalities_from_product(
        &self,
        Parameters(params): Parameters<BulkAssignmentParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.require_identity(&request)?.map(|i| i.username);
        tracing::info!(
            product = %params.product_code,
            requested = params.functionality_codes.len(),
            caller = ?caller,
            "Running remove_functionalities_from_product tool"
        );

        let outcome = self
            .resolve::<OntologyManager>()
            .remove_functionalities_from_product(&params.product_code, &params.functionality_codes)
            .await?;

        RemovalResult::new(params.product_code, outcome)
            .into_envelope()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(successful: &[&str], failed: &[&str]) -> BulkOutcome {
        BulkOutcome {
            successful: successful.iter().map(|c| c.to_string()).collect(),
            failed: failed
                .iter()
                .map(|c| BulkFailure {
                    functionality_code: c.to_string(),
                    reason: "Functionality not found".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_summary_counts_failures() {
        let result = AssignmentResult::new("ERP".into(), outcome(&["A", "B", "C"], &["D", "E"]));
        assert_eq!(result.summary.total_requested, 5);
        assert_eq!(result.summary.successful, 3);
        assert_eq!(result.summary.failed, 2);

        let envelope = result.into_envelope();
        assert!(envelope.success);
        assert_eq!(envelope.message, "Assigned 3 of 5 functionalities to 'ERP'");
    }

    #[test]
    fn test_all_failed_assignment_is_a_failed_envelope() {
        let envelope = AssignmentResult::new("ERP".into(), outcome(&[], &["X", "Y"])).into_envelope();

        assert!(!envelope.success);
        assert_eq!(envelope.data.summary.failed, 2);
        assert_eq!(envelope.data.failed_assignments[0].functionality_code, "X");
    }

    #[test]
    fn test_all_failed_removal_is_a_failed_envelope() {
        let envelope = RemovalResult::new("ERP".into(), outcome(&[], &["X"])).into_envelope();

        assert!(!envelope.success);
        assert_eq!(envelope.message, "Removed 0 of 1 functionalities from 'ERP'");
    }
}

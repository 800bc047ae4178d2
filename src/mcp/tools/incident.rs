//! Incident tools - incidents, resolutions and incident listings.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    service::{RequestContext, RoleServer},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::mcp::protocol::{Envelope, OutputFormat, Response};
use crate::mcp::server::McpServer;
use crate::services::{OntologyManager, Page};

pub const INCOMPLETE_DATA: &str = "Datos incompletos proporcionados";

// ============================================================================
// Parameter Types
// ============================================================================

/// Every field is mandatory; missing ones are reported together.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RegisterIncidentParams {
    /// Unique incident code, e.g. "INC001".
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    /// One of SLA_CRITICAL, SLA_HIGH, SLA_MEDIUM, SLA_LOW.
    #[serde(default)]
    pub sla_level: String,
    /// Functionality the incident is raised against.
    #[serde(default)]
    pub functionality_code: String,
}

impl RegisterIncidentParams {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("code", &self.code),
            ("description", &self.description),
            ("sla_level", &self.sla_level),
            ("functionality_code", &self.functionality_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RegisterResolutionParams {
    pub incident_code: String,
    /// RFC 3339 timestamp, or `YYYY-MM-DDTHH:MM:SS` read as UTC.
    pub resolution_date: String,
    /// What was done to resolve the incident.
    pub procedure: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IncidentCodeParams {
    pub incident_code: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IncidentsByFunctionalityParams {
    pub functionality_code: String,
    /// Page size, 1 to 1000 (default 50).
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    /// Output format: "json" (default) or "toon".
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IncidentsByProductParams {
    pub product_code: String,
    /// Page size, 1 to 1000 (default 50).
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    /// Output format: "json" (default) or "toon".
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router(router = incident_tools, vis = "pub(crate)")]
impl McpServer {
    #[tool(
        description = "Register an incident against a functionality. All fields are required; incomplete input fails with 'Datos incompletos proporcionados'. Requires authentication."
    )]
    pub async fn register_incident(
        &self,
        Parameters(params): Parameters<RegisterIncidentParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.require_identity(&request)?.map(|i| i.username);
        tracing::info!(code = %params.code, caller = ?caller, "Running register_incident tool");

        let missing = params.missing_fields();
        if !missing.is_empty() {
            tracing::error!(missing = ?missing, "Incomplete incident data");
            return Err(AppError::Validation(INCOMPLETE_DATA.into()).into());
        }

        let incident = self
            .resolve::<OntologyManager>()
            .create_incident(
                &params.code,
                &params.description,
                &params.sla_level,
                &params.functionality_code,
            )
            .await?;

        Envelope::ok(
            format!("Incident '{}' registered successfully", incident.code),
            incident,
        )
        .into()
    }

    #[tool(description = "Record the resolution of an existing incident. Requires authentication.")]
    pub async fn register_resolution(
        &self,
        Parameters(params): Parameters<RegisterResolutionParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.require_identity(&request)?.map(|i| i.username);
        tracing::info!(incident = %params.incident_code, caller = ?caller, "Running register_resolution tool");

        let resolution = self
            .resolve::<OntologyManager>()
            .create_resolution(
                &params.incident_code,
                &params.resolution_date,
                &params.procedure,
            )
            .await?;

        Envelope::ok(
            format!("Resolution for '{}' registered successfully", resolution.incident_code),
            resolution,
        )
        .into()
    }

    #[tool(description = "Get an incident with its functionality code and resolution, if any.")]
    pub async fn get_incident_details(
        &self,
        Parameters(params): Parameters<IncidentCodeParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.optional_identity(&request).map(|i| i.username);
        tracing::info!(incident = %params.incident_code, caller = ?caller, "Running get_incident_details tool");

        let record = self
            .resolve::<OntologyManager>()
            .get_incident(&params.incident_code)
            .await?
            .ok_or_else(|| AppError::not_found("Incident", &params.incident_code))?;

        Envelope::ok(
            format!("Incident '{}' retrieved", record.incident.code),
            record,
        )
        .into()
    }

    #[tool(
        description = "List incidents of a functionality with their resolutions, newest first. Paginated."
    )]
    pub async fn list_incidents_by_functionality(
        &self,
        Parameters(params): Parameters<IncidentsByFunctionalityParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.optional_identity(&request).map(|i| i.username);
        tracing::info!(
            functionality = %params.functionality_code,
            caller = ?caller,
            "Running list_incidents_by_functionality tool"
        );
        let page = Page::new(params.limit, params.offset)?;

        let manager = self.resolve::<OntologyManager>();
        if manager
            .get_functionality(&params.functionality_code)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("Functionality", &params.functionality_code).into());
        }

        let incidents = manager
            .get_incidents_by_functionality(&params.functionality_code)
            .await?;

        Response(
            Envelope::paginated(
                format!("Incidents for functionality '{}'", params.functionality_code),
                incidents,
                page,
            ),
            params.format,
        )
        .into()
    }

    #[tool(
        description = "List incidents across all functionalities of a product, newest first, each with its functionality code. Paginated."
    )]
    pub async fn list_incidents_by_product(
        &self,
        Parameters(params): Parameters<IncidentsByProductParams>,
        request: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let caller = self.optional_identity(&request).map(|i| i.username);
        tracing::info!(
            product = %params.product_code,
            caller = ?caller,
            "Running list_incidents_by_product tool"
        );
        let page = Page::new(params.limit, params.offset)?;

        let manager = self.resolve::<OntologyManager>();
        if manager.get_product(&params.product_code).await?.is_none() {
            return Err(AppError::not_found("Product", &params.product_code).into());
        }

        let incidents = manager.get_incidents_by_product(&params.product_code).await?;

        Response(
            Envelope::paginated(
                format!("Incidents for product '{}'", params.product_code),
                incidents,
                page,
            ),
            params.format,
        )
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_reported_together() {
        let params = RegisterIncidentParams {
            code: "INC001".into(),
            description: "  ".into(),
            ..Default::default()
        };
        assert_eq!(
            params.missing_fields(),
            vec!["description", "sla_level", "functionality_code"]
        );
    }

    #[test]
    fn test_complete_params() {
        let params: RegisterIncidentParams = serde_json::from_value(serde_json::json!({
            "code": "INC001",
            "description": "Login fails",
            "sla_level": "SLA_HIGH",
            "functionality_code": "AUTENTICACION"
        }))
        .unwrap();
        assert!(params.missing_fields().is_empty());
    }
}

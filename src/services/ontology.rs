//! Ontology manager: domain operations over products, functionalities,
//! components, incidents and resolutions.
//!
//! The store guarantees code uniqueness. Everything else is enforced here:
//! - incidents only under an existing functionality,
//! - resolutions only under an existing incident,
//! - assignments only between existing endpoints.

use serde::Serialize;

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{
    parse_resolution_date, Component, ComponentDetails, Functionality, FunctionalityDetails,
    Incident, IncidentRecord, Product, ProductDetails, ProductSummary, ProductUpdate, Resolution,
    SlaLevel, UpdateOutcome,
};
use crate::repositories::{
    AssignmentRepository, ClearReport, ComponentRepository, FunctionalityRepository, GraphStats,
    IncidentRepository, ProductRepository, ResolutionRepository, SchemaRepository,
};
use crate::services::validation;

/// Logs store failures on their way out; other errors pass silently.
trait LogStoreError {
    fn log_store_error(self, operation: &str, code: &str) -> Self;
}

impl<T> LogStoreError for Result<T, AppError> {
    fn log_store_error(self, operation: &str, code: &str) -> Self {
        if let Err(e @ (AppError::Store(_) | AppError::Query { .. })) = &self {
            tracing::error!(operation = %operation, code = %code, error = %e, "Store operation failed");
        }
        self
    }
}

/// A functionality code that could not be assigned or removed, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    pub functionality_code: String,
    pub reason: String,
}

/// Per-code result of a bulk assignment or removal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    pub successful: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn requested(&self) -> usize {
        self.successful.len() + self.failed.len()
    }

    fn fail(&mut self, functionality_code: &str, reason: impl Into<String>) {
        self.failed.push(BulkFailure {
            functionality_code: functionality_code.to_string(),
            reason: reason.into(),
        });
    }
}

#[derive(FromContext, Clone)]
pub struct OntologyManager {
    products: ProductRepository,
    functionalities: FunctionalityRepository,
    components: ComponentRepository,
    incidents: IncidentRepository,
    resolutions: ResolutionRepository,
    assignments: AssignmentRepository,
    schema: SchemaRepository,
}

impl OntologyManager {
    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub async fn create_product(&self, code: &str, name: &str) -> Result<Product, AppError> {
        let code = validation::code("code", code)?;
        let name = validation::name(name)?;

        let product = self
            .products
            .upsert(&code, &name)
            .await
            .log_store_error("create_product", &code)?
            .ok_or_else(|| AppError::Integrity(format!("MERGE returned no product for {}", code)))?;

        tracing::info!(code = %code, "Product upserted");
        Ok(product)
    }

    pub async fn get_product(&self, code: &str) -> Result<Option<Product>, AppError> {
        let code = validation::code("code", code)?;
        self.products
            .find(&code)
            .await
            .log_store_error("get_product", &code)
    }

    /// The product, or NotFound.
    pub async fn require_product(&self, code: &str) -> Result<Product, AppError> {
        let code = validation::code("product_code", code)?;
        self.get_product(&code)
            .await?
            .ok_or_else(|| AppError::not_found("Product", &code))
    }

    /// Applies the allow-listed fields of `update`.
    pub async fn update_product(
        &self,
        code: &str,
        update: ProductUpdate,
    ) -> Result<UpdateOutcome, AppError> {
        let code = validation::code("code", code)?;
        if update.is_empty() {
            return Ok(UpdateOutcome::NoChanges);
        }

        let update = ProductUpdate {
            name: update.name.as_deref().map(validation::name).transpose()?,
        };

        let product = self
            .products
            .update(&code, &update)
            .await
            .log_store_error("update_product", &code)?
            .ok_or_else(|| AppError::not_found("Product", &code))?;

        tracing::info!(code = %code, "Product updated");
        Ok(UpdateOutcome::Updated(product))
    }

    /// Detach-deletes a product. `false` means there was nothing to delete.
    pub async fn delete_product(&self, code: &str) -> Result<bool, AppError> {
        let code = validation::code("code", code)?;
        let deleted = self
            .products
            .delete(&code)
            .await
            .log_store_error("delete_product", &code)?;

        if deleted {
            tracing::info!(code = %code, "Product deleted");
        }
        Ok(deleted)
    }

    /// All products ordered by code.
    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.products
            .list()
            .await
            .log_store_error("list_products", "*")
    }

    pub async fn search_products(&self, query: &str, limit: usize) -> Result<Vec<Product>, AppError> {
        let query = validation::non_empty("query", query)?;
        self.products
            .search(&query, limit)
            .await
            .log_store_error("search_products", &query)
    }

    pub async fn get_all_products_summary(&self) -> Result<Vec<ProductSummary>, AppError> {
        self.products
            .summary()
            .await
            .log_store_error("get_all_products_summary", "*")
    }

    pub async fn get_product_with_functionalities(
        &self,
        code: &str,
    ) -> Result<Option<ProductDetails>, AppError> {
        let code = validation::code("code", code)?;
        self.products
            .details(&code)
            .await
            .log_store_error("get_product_with_functionalities", &code)
    }

    // ------------------------------------------------------------------
    // Functionalities
    // ------------------------------------------------------------------

    pub async fn create_functionality(
        &self,
        code: &str,
        name: &str,
    ) -> Result<Functionality, AppError> {
        let code = validation::code("code", code)?;
        let name = validation::name(name)?;

        let functionality = self
            .functionalities
            .upsert(&code, &name)
            .await
            .log_store_error("create_functionality", &code)?
            .ok_or_else(|| {
                AppError::Integrity(format!("MERGE returned no functionality for {}", code))
            })?;

        tracing::info!(code = %code, "Functionality upserted");
        Ok(functionality)
    }

    pub async fn get_functionality(&self, code: &str) -> Result<Option<Functionality>, AppError> {
        let code = validation::code("code", code)?;
        self.functionalities
            .find(&code)
            .await
            .log_store_error("get_functionality", &code)
    }

    pub async fn list_functionalities(&self) -> Result<Vec<Functionality>, AppError> {
        self.functionalities
            .list()
            .await
            .log_store_error("list_functionalities", "*")
    }

    pub async fn search_functionalities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Functionality>, AppError> {
        let query = validation::non_empty("query", query)?;
        self.functionalities
            .search(&query, limit)
            .await
            .log_store_error("search_functionalities", &query)
    }

    pub async fn get_functionality_with_products(
        &self,
        code: &str,
    ) -> Result<Option<FunctionalityDetails>, AppError> {
        let code = validation::code("code", code)?;
        self.functionalities
            .details(&code)
            .await
            .log_store_error("get_functionality_with_products", &code)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    pub async fn create_component(&self, code: &str, name: &str) -> Result<Component, AppError> {
        let code = validation::code("code", code)?;
        let name = validation::name(name)?;

        let component = self
            .components
            .upsert(&code, &name)
            .await
            .log_store_error("create_component", &code)?
            .ok_or_else(|| {
                AppError::Integrity(format!("MERGE returned no component for {}", code))
            })?;

        tracing::info!(code = %code, "Component upserted");
        Ok(component)
    }

    pub async fn get_component(&self, code: &str) -> Result<Option<Component>, AppError> {
        let code = validation::code("code", code)?;
        self.components
            .find(&code)
            .await
            .log_store_error("get_component", &code)
    }

    pub async fn get_component_with_functionalities(
        &self,
        code: &str,
    ) -> Result<Option<ComponentDetails>, AppError> {
        let code = validation::code("code", code)?;
        self.components
            .details(&code)
            .await
            .log_store_error("get_component_with_functionalities", &code)
    }

    // ------------------------------------------------------------------
    // Incidents and resolutions
    // ------------------------------------------------------------------

    /// Creates an incident under an existing functionality.
    ///
    /// The SLA level is checked before anything is sent to the store.
    pub async fn create_incident(
        &self,
        code: &str,
        description: &str,
        sla_level: &str,
        functionality_code: &str,
    ) -> Result<Incident, AppError> {
        let code = validation::code("code", code)?;
        let description = validation::description(description)?;
        let sla_level: SlaLevel = sla_level.parse().map_err(AppError::Validation)?;
        let functionality_code = validation::code("functionality_code", functionality_code)?;

        let incident = self
            .incidents
            .upsert(&code, &description, sla_level, &functionality_code)
            .await
            .log_store_error("create_incident", &code)?
            .ok_or_else(|| AppError::parent_not_found("Functionality", &functionality_code))?;

        tracing::info!(
            code = %code,
            functionality = %functionality_code,
            sla = %sla_level,
            "Incident upserted"
        );
        Ok(incident)
    }

    pub async fn get_incident(&self, code: &str) -> Result<Option<IncidentRecord>, AppError> {
        let code = validation::code("code", code)?;
        self.incidents
            .find(&code)
            .await
            .log_store_error("get_incident", &code)
    }

    /// Incidents of a functionality with their resolutions, newest first.
    pub async fn get_incidents_by_functionality(
        &self,
        functionality_code: &str,
    ) -> Result<Vec<IncidentRecord>, AppError> {
        let functionality_code = validation::code("functionality_code", functionality_code)?;
        self.incidents
            .by_functionality(&functionality_code)
            .await
            .log_store_error("get_incidents_by_functionality", &functionality_code)
    }

    /// Incidents reachable from a product through its functionalities, newest first.
    pub async fn get_incidents_by_product(
        &self,
        product_code: &str,
    ) -> Result<Vec<IncidentRecord>, AppError> {
        let product_code = validation::code("product_code", product_code)?;
        self.incidents
            .by_product(&product_code)
            .await
            .log_store_error("get_incidents_by_product", &product_code)
    }

    /// Records how an incident was resolved.
    ///
    /// An unparseable date is a validation error; it is never replaced by
    /// the current time.
    pub async fn create_resolution(
        &self,
        incident_code: &str,
        resolution_date: &str,
        procedure: &str,
    ) -> Result<Resolution, AppError> {
        let incident_code = validation::code("incident_code", incident_code)?;
        let procedure = validation::non_empty("procedure", procedure)?;
        let resolution_date =
            parse_resolution_date(resolution_date).map_err(AppError::Validation)?;

        let resolution = self
            .resolutions
            .upsert(&incident_code, &resolution_date, &procedure)
            .await
            .log_store_error("create_resolution", &incident_code)?
            .ok_or_else(|| AppError::parent_not_found("Incident", &incident_code))?;

        tracing::info!(incident = %incident_code, "Resolution upserted");
        Ok(resolution)
    }

    pub async fn get_resolution(&self, incident_code: &str) -> Result<Option<Resolution>, AppError> {
        let incident_code = validation::code("incident_code", incident_code)?;
        self.resolutions
            .find(&incident_code)
            .await
            .log_store_error("get_resolution", &incident_code)
    }

    // ------------------------------------------------------------------
    // Assignments
    // ------------------------------------------------------------------

    pub async fn assign_functionality_to_product(
        &self,
        product_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        let product_code = validation::code("product_code", product_code)?;
        let functionality_code = validation::code("functionality_code", functionality_code)?;

        if self.get_product(&product_code).await?.is_none() {
            return Err(AppError::not_found("Product", &product_code));
        }
        if self.get_functionality(&functionality_code).await?.is_none() {
            return Err(AppError::not_found("Functionality", &functionality_code));
        }

        let assigned = self
            .assignments
            .assign_to_product(&product_code, &functionality_code)
            .await
            .log_store_error("assign_functionality_to_product", &product_code)?;

        tracing::info!(
            product = %product_code,
            functionality = %functionality_code,
            "Functionality assigned to product"
        );
        Ok(assigned)
    }

    pub async fn assign_functionality_to_component(
        &self,
        component_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        let component_code = validation::code("component_code", component_code)?;
        let functionality_code = validation::code("functionality_code", functionality_code)?;

        if self.get_component(&component_code).await?.is_none() {
            return Err(AppError::not_found("Component", &component_code));
        }
        if self.get_functionality(&functionality_code).await?.is_none() {
            return Err(AppError::not_found("Functionality", &functionality_code));
        }

        let assigned = self
            .assignments
            .assign_to_component(&component_code, &functionality_code)
            .await
            .log_store_error("assign_functionality_to_component", &component_code)?;

        tracing::info!(
            component = %component_code,
            functionality = %functionality_code,
            "Functionality assigned to component"
        );
        Ok(assigned)
    }

    /// Returns whether an edge was removed. A pair that was never assigned is
    /// not an error.
    pub async fn remove_functionality_from_product(
        &self,
        product_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        let product_code = validation::code("product_code", product_code)?;
        let functionality_code = validation::code("functionality_code", functionality_code)?;

        let removed = self
            .assignments
            .remove_from_product(&product_code, &functionality_code)
            .await
            .log_store_error("remove_functionality_from_product", &product_code)?;

        if removed {
            tracing::info!(
                product = %product_code,
                functionality = %functionality_code,
                "Functionality removed from product"
            );
        }
        Ok(removed)
    }

    pub async fn remove_functionality_from_component(
        &self,
        component_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        let component_code = validation::code("component_code", component_code)?;
        let functionality_code = validation::code("functionality_code", functionality_code)?;

        let removed = self
            .assignments
            .remove_from_component(&component_code, &functionality_code)
            .await
            .log_store_error("remove_functionality_from_component", &component_code)?;

        if removed {
            tracing::info!(
                component = %component_code,
                functionality = %functionality_code,
                "Functionality removed from component"
            );
        }
        Ok(removed)
    }

    /// Assigns each code to an existing product.
    ///
    /// A missing product fails the whole call. Unknown or invalid
    /// functionality codes are collected per code.
    pub async fn assign_functionalities_to_product(
        &self,
        product_code: &str,
        functionality_codes: &[String],
    ) -> Result<BulkOutcome, AppError> {
        let product = self.require_product(product_code).await?;
        let mut outcome = BulkOutcome::default();

        for code in functionality_codes {
            match self.assign_functionality_to_product(&product.code, code).await {
                Ok(true) => outcome.successful.push(code.clone()),
                Ok(false) => outcome.fail(code, "Assignment was not created"),
                Err(e @ (AppError::NotFound { .. } | AppError::Validation(_))) => {
                    outcome.fail(code, e.to_string())
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }

    /// Removes each code from an existing product. Pairs that were never
    /// assigned are collected as failures.
    pub async fn remove_functionalities_from_product(
        &self,
        product_code: &str,
        functionality_codes: &[String],
    ) -> Result<BulkOutcome, AppError> {
        let product = self.require_product(product_code).await?;
        let mut outcome = BulkOutcome::default();

        for code in functionality_codes {
            match self
                .remove_functionality_from_product(&product.code, code)
                .await
            {
                Ok(true) => outcome.successful.push(code.clone()),
                Ok(false) => outcome.fail(
                    code,
                    format!("'{}' is not assigned to '{}'", code, product.code),
                ),
                Err(e @ AppError::Validation(_)) => outcome.fail(code, e.to_string()),
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    pub async fn create_constraints(&self) -> Result<(), AppError> {
        self.schema
            .create_constraints()
            .await
            .log_store_error("create_constraints", "*")
    }

    /// Textual schema of the live graph.
    pub async fn describe_schema(&self) -> Result<String, AppError> {
        self.schema
            .describe()
            .await
            .log_store_error("describe_schema", "*")
    }

    pub async fn stats(&self) -> Result<GraphStats, AppError> {
        self.schema.stats().await.log_store_error("stats", "*")
    }

    /// Removes every ontology node and edge.
    pub async fn clear_all(&self) -> Result<ClearReport, AppError> {
        tracing::warn!("Clearing all ontology data");
        self.schema
            .clear_all()
            .await
            .log_store_error("clear_all", "*")
    }
}

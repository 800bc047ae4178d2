//! Product repository.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Graph, QueryExt, Row};
use crate::models::{
    now_timestamp, Functionality, Incident, Product, ProductDetails, ProductSummary,
    ProductUpdate, Resolution,
};

/// Updatable product fields and the fixed SET fragment each one maps to.
const UPDATABLE_FIELDS: &[(&str, &str)] = &[("name", "p.name = $name")];

#[derive(FromContext, Clone)]
pub struct ProductRepository {
    graph: Graph,
}

impl ProductRepository {
    /// Merge a product by code. `created_at` is only written on creation.
    pub async fn upsert(&self, code: &str, name: &str) -> Result<Option<Product>, AppError> {
        let row = self
            .graph
            .query(
                "MERGE (p:Product {code: $code})
                 ON CREATE SET p.created_at = $now
                 SET p.name = $name
                 RETURN p {.*} AS p",
            )
            .param("code", code)
            .param("name", name)
            .param("now", now_timestamp())
            .fetch_one()
            .await?;

        row.map(|row| row.get("p")).transpose()
    }

    pub async fn find(&self, code: &str) -> Result<Option<Product>, AppError> {
        let row = self
            .graph
            .query("MATCH (p:Product {code: $code}) RETURN p {.*} AS p")
            .param("code", code)
            .fetch_one()
            .await?;

        row.map(|row| row.get("p")).transpose()
    }

    /// Apply a partial update. Returns `None` when the product does not exist.
    ///
    /// Callers must not pass an empty update.
    pub async fn update(
        &self,
        code: &str,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, AppError> {
        let present = |field: &str| match field {
            "name" => update.name.is_some(),
            _ => false,
        };

        let mut assignments: Vec<&str> = UPDATABLE_FIELDS
            .iter()
            .filter(|(field, _)| present(field))
            .map(|(_, fragment)| *fragment)
            .collect();
        assignments.push("p.updated_at = $now");

        let cypher = format!(
            "MATCH (p:Product {{code: $code}})
             SET {}
             RETURN p {{.*}} AS p",
            assignments.join(", ")
        );

        let row = self
            .graph
            .query(&cypher)
            .param("code", code)
            .param("name", update.name.as_deref())
            .param("now", now_timestamp())
            .fetch_one()
            .await?;

        row.map(|row| row.get("p")).transpose()
    }

    /// Detach-delete a product. Returns whether a node was removed.
    pub async fn delete(&self, code: &str) -> Result<bool, AppError> {
        let deleted: Option<i64> = self
            .graph
            .query(
                "MATCH (p:Product {code: $code})
                 DETACH DELETE p
                 RETURN count(p) AS deleted",
            )
            .param("code", code)
            .fetch_value("deleted")
            .await?;

        Ok(deleted.unwrap_or(0) > 0)
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        let rows = self
            .graph
            .query("MATCH (p:Product) RETURN p {.*} AS p ORDER BY p.code")
            .fetch_all()
            .await?;

        rows.iter().map(|row| row.get("p")).collect()
    }

    /// Case-insensitive substring search over code and name.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (p:Product)
                 WHERE toLower(p.code) CONTAINS toLower($query)
                    OR toLower(p.name) CONTAINS toLower($query)
                 RETURN p {.*} AS p
                 ORDER BY p.code
                 LIMIT $limit",
            )
            .param("query", query)
            .param("limit", limit as i64)
            .fetch_all()
            .await?;

        rows.iter().map(|row| row.get("p")).collect()
    }

    /// Every product with the codes of its assigned functionalities.
    pub async fn summary(&self) -> Result<Vec<ProductSummary>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (p:Product)
                 OPTIONAL MATCH (p)-[:ASIGNACION_FUNCIONALIDAD]->(f:Functionality)
                 WITH p, collect(DISTINCT f.code) AS functionalities
                 RETURN p {.*} AS p, functionalities
                 ORDER BY p.code",
            )
            .fetch_all()
            .await?;

        rows.iter()
            .map(|row| {
                let functionalities: Vec<String> = row.get_list("functionalities")?;
                Ok(ProductSummary {
                    product: row.get("p")?,
                    functionality_count: functionalities.len(),
                    functionalities,
                })
            })
            .collect()
    }

    /// The product plus its functionalities and their incidents and resolutions.
    pub async fn details(&self, code: &str) -> Result<Option<ProductDetails>, AppError> {
        let row = self
            .graph
            .query(
                "MATCH (p:Product {code: $code})
                 OPTIONAL MATCH (p)-[:ASIGNACION_FUNCIONALIDAD]->(f:Functionality)
                 OPTIONAL MATCH (f)-[:HAS_INCIDENT]->(i:Incident)
                 OPTIONAL MATCH (i)-[:HAS_RESOLUTION]->(r:Resolution)
                 RETURN p {.*} AS p,
                        collect(DISTINCT f {.*}) AS functionalities,
                        collect(DISTINCT i {.*}) AS incidents,
                        collect(DISTINCT r {.*}) AS resolutions",
            )
            .param("code", code)
            .fetch_one()
            .await?;

        row.map(|row| Self::row_to_details(&row)).transpose()
    }

    fn row_to_details(row: &Row) -> Result<ProductDetails, AppError> {
        let functionalities: Vec<Functionality> = row.get_list("functionalities")?;
        let incidents: Vec<Incident> = row.get_list("incidents")?;
        let resolutions: Vec<Resolution> = row.get_list("resolutions")?;

        Ok(ProductDetails {
            product: row.get("p")?,
            functionalities,
            incidents,
            resolutions,
        })
    }
}

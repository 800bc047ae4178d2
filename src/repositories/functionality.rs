//! Functionality repository.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Graph, QueryExt, Row};
use crate::models::{now_timestamp, Functionality, FunctionalityDetails};

#[derive(FromContext, Clone)]
pub struct FunctionalityRepository {
    graph: Graph,
}

impl FunctionalityRepository {
    pub async fn upsert(&self, code: &str, name: &str) -> Result<Option<Functionality>, AppError> {
        let row = self
            .graph
            .query(
                "MERGE (f:Functionality {code: $code})
                 ON CREATE SET f.created_at = $now
                 SET f.name = $name
                 RETURN f {.*} AS f",
            )
            .param("code", code)
            .param("name", name)
            .param("now", now_timestamp())
            .fetch_one()
            .await?;

        row.map(|row| row.get("f")).transpose()
    }

    pub async fn find(&self, code: &str) -> Result<Option<Functionality>, AppError> {
        let row = self
            .graph
            .query("MATCH (f:Functionality {code: $code}) RETURN f {.*} AS f")
            .param("code", code)
            .fetch_one()
            .await?;

        row.map(|row| row.get("f")).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Functionality>, AppError> {
        let rows = self
            .graph
            .query("MATCH (f:Functionality) RETURN f {.*} AS f ORDER BY f.code")
            .fetch_all()
            .await?;

        rows.iter().map(|row| row.get("f")).collect()
    }

    /// Case-insensitive substring search over code and name.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Functionality>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (f:Functionality)
                 WHERE toLower(f.code) CONTAINS toLower($query)
                    OR toLower(f.name) CONTAINS toLower($query)
                 RETURN f {.*} AS f
                 ORDER BY f.code
                 LIMIT $limit",
            )
            .param("query", query)
            .param("limit", limit as i64)
            .fetch_all()
            .await?;

        rows.iter().map(|row| row.get("f")).collect()
    }

    /// The functionality with the products and components assigned to it,
    /// plus its incidents and their resolutions.
    pub async fn details(&self, code: &str) -> Result<Option<FunctionalityDetails>, AppError> {
        let row = self
            .graph
            .query(
                "MATCH (f:Functionality {code: $code})
                 OPTIONAL MATCH (p:Product)-[:ASIGNACION_FUNCIONALIDAD]->(f)
                 OPTIONAL MATCH (c:Component)-[:ASIGNACION_FUNCIONALIDAD]->(f)
                 OPTIONAL MATCH (f)-[:HAS_INCIDENT]->(i:Incident)
                 OPTIONAL MATCH (i)-[:HAS_RESOLUTION]->(r:Resolution)
                 RETURN f {.*} AS f,
                        collect(DISTINCT p {.*}) AS products,
                        collect(DISTINCT c {.*}) AS components,
                        collect(DISTINCT i {.*}) AS incidents,
                        collect(DISTINCT r {.*}) AS resolutions",
            )
            .param("code", code)
            .fetch_one()
            .await?;

        row.map(|row| Self::row_to_details(&row)).transpose()
    }

    fn row_to_details(row: &Row) -> Result<FunctionalityDetails, AppError> {
        Ok(FunctionalityDetails {
            functionality: row.get("f")?,
            products: row.get_list("products")?,
            components: row.get_list("components")?,
            incidents: row.get_list("incidents")?,
            resolutions: row.get_list("resolutions")?,
        })
    }
}

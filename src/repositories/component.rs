//! Component repository.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Graph, QueryExt};
use crate::models::{now_timestamp, Component, ComponentDetails};

#[derive(FromContext, Clone)]
pub struct ComponentRepository {
    graph: Graph,
}

impl ComponentRepository {
    pub async fn upsert(&self, code: &str, name: &str) -> Result<Option<Component>, AppError> {
        let row = self
            .graph
            .query(
                "MERGE (c:Component {code: $code})
                 ON CREATE SET c.created_at = $now
                 SET c.name = $name
                 RETURN c {.*} AS c",
            )
            .param("code", code)
            .param("name", name)
            .param("now", now_timestamp())
            .fetch_one()
            .await?;

        row.map(|row| row.get("c")).transpose()
    }

    pub async fn find(&self, code: &str) -> Result<Option<Component>, AppError> {
        let row = self
            .graph
            .query("MATCH (c:Component {code: $code}) RETURN c {.*} AS c")
            .param("code", code)
            .fetch_one()
            .await?;

        row.map(|row| row.get("c")).transpose()
    }

    pub async fn details(&self, code: &str) -> Result<Option<ComponentDetails>, AppError> {
        let row = self
            .graph
            .query(
                "MATCH (c:Component {code: $code})
                 OPTIONAL MATCH (c)-[:ASIGNACION_FUNCIONALIDAD]->(f:Functionality)
                 OPTIONAL MATCH (f)-[:HAS_INCIDENT]->(i:Incident)
                 OPTIONAL MATCH (i)-[:HAS_RESOLUTION]->(r:Resolution)
                 RETURN c {.*} AS c,
                        collect(DISTINCT f {.*}) AS functionalities,
                        collect(DISTINCT i {.*}) AS incidents,
                        collect(DISTINCT r {.*}) AS resolutions",
            )
            .param("code", code)
            .fetch_one()
            .await?;

        match row {
            Some(row) => Ok(Some(ComponentDetails {
                component: row.get("c")?,
                functionalities: row.get_list("functionalities")?,
                incidents: row.get_list("incidents")?,
                resolutions: row.get_list("resolutions")?,
            })),
            None => Ok(None),
        }
    }
}

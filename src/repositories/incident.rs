//! Incident repository.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Graph, QueryExt, Row};
use crate::models::{now_timestamp, Incident, IncidentRecord, SlaLevel};

#[derive(FromContext, Clone)]
pub struct IncidentRepository {
    graph: Graph,
}

impl IncidentRepository {
    /// Merge an incident under its functionality in a single statement.
    ///
    /// Returns `None`, having written nothing, when the functionality does not
    /// exist. An incident moved to another functionality loses its old edge.
    pub async fn upsert(
        &self,
        code: &str,
        description: &str,
        sla_level: SlaLevel,
        functionality_code: &str,
    ) -> Result<Option<Incident>, AppError> {
        let row = self
            .graph
            .query(
                "MATCH (f:Functionality {code: $functionality_code})
                 MERGE (i:Incident {code: $code})
                 ON CREATE SET i.created_at = $now
                 SET i.description = $description, i.sla_level = $sla_level
                 MERGE (f)-[:HAS_INCIDENT]->(i)
                 WITH f, i
                 OPTIONAL MATCH (other:Functionality)-[stale:HAS_INCIDENT]->(i)
                 WHERE other <> f
                 DELETE stale
                 WITH DISTINCT i
                 RETURN i {.*} AS i",
            )
            .param("code", code)
            .param("description", description)
            .param("sla_level", sla_level.as_str())
            .param("functionality_code", functionality_code)
            .param("now", now_timestamp())
            .fetch_one()
            .await?;

        row.map(|row| row.get("i")).transpose()
    }

    /// An incident with its owning functionality and resolution.
    pub async fn find(&self, code: &str) -> Result<Option<IncidentRecord>, AppError> {
        let row = self
            .graph
            .query(
                "MATCH (i:Incident {code: $code})
                 OPTIONAL MATCH (f:Functionality)-[:HAS_INCIDENT]->(i)
                 OPTIONAL MATCH (i)-[:HAS_RESOLUTION]->(r:Resolution)
                 RETURN i {.*} AS i, f.code AS functionality_code, r {.*} AS r
                 LIMIT 1",
            )
            .param("code", code)
            .fetch_one()
            .await?;

        row.map(|row| Self::row_to_record(&row)).transpose()
    }

    /// Incidents of a functionality, newest first.
    pub async fn by_functionality(
        &self,
        functionality_code: &str,
    ) -> Result<Vec<IncidentRecord>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (f:Functionality {code: $functionality_code})-[:HAS_INCIDENT]->(i:Incident)
                 OPTIONAL MATCH (i)-[:HAS_RESOLUTION]->(r:Resolution)
                 RETURN i {.*} AS i, f.code AS functionality_code, r {.*} AS r
                 ORDER BY i.created_at DESC",
            )
            .param("functionality_code", functionality_code)
            .fetch_all()
            .await?;

        rows.iter().map(Self::row_to_record).collect()
    }

    /// Incidents of every functionality assigned to a product, newest first.
    pub async fn by_product(&self, product_code: &str) -> Result<Vec<IncidentRecord>, AppError> {
        let rows = self
            .graph
            .query(
                "MATCH (p:Product {code: $product_code})-[:ASIGNACION_FUNCIONALIDAD]->(f:Functionality)
                 MATCH (f)-[:HAS_INCIDENT]->(i:Incident)
                 OPTIONAL MATCH (i)-[:HAS_RESOLUTION]->(r:Resolution)
                 RETURN i {.*} AS i, f.code AS functionality_code, r {.*} AS r
                 ORDER BY i.created_at DESC",
            )
            .param("product_code", product_code)
            .fetch_all()
            .await?;

        rows.iter().map(Self::row_to_record).collect()
    }

    fn row_to_record(row: &Row) -> Result<IncidentRecord, AppError> {
        Ok(IncidentRecord {
            incident: row.get("i")?,
            functionality_code: row.get_opt("functionality_code")?,
            resolution: row.get_opt("r")?,
        })
    }
}

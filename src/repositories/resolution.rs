//! Resolution repository.

use chrono::{DateTime, Utc};

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Graph, QueryExt};
use crate::models::{format_timestamp, now_timestamp, Resolution};

#[derive(FromContext, Clone)]
pub struct ResolutionRepository {
    graph: Graph,
}

impl ResolutionRepository {
    /// Merge the resolution of an incident in a single statement.
    ///
    /// Returns `None`, having written nothing, when the incident does not exist.
    pub async fn upsert(
        &self,
        incident_code: &str,
        resolution_date: &DateTime<Utc>,
        procedure: &str,
    ) -> Result<Option<Resolution>, AppError> {
        let row = self
            .graph
            .query(
                "MATCH (i:Incident {code: $incident_code})
                 MERGE (r:Resolution {incident_code: $incident_code})
                 ON CREATE SET r.created_at = $now
                 SET r.resolution_date = $resolution_date, r.procedure = $procedure
                 MERGE (i)-[:HAS_RESOLUTION]->(r)
                 RETURN r {.*} AS r",
            )
            .param("incident_code", incident_code)
            .param("resolution_date", format_timestamp(resolution_date))
            .param("procedure", procedure)
            .param("now", now_timestamp())
            .fetch_one()
            .await?;

        row.map(|row| row.get("r")).transpose()
    }

    pub async fn find(&self, incident_code: &str) -> Result<Option<Resolution>, AppError> {
        let row = self
            .graph
            .query("MATCH (r:Resolution {incident_code: $incident_code}) RETURN r {.*} AS r")
            .param("incident_code", incident_code)
            .fetch_one()
            .await?;

        row.map(|row| row.get("r")).transpose()
    }
}

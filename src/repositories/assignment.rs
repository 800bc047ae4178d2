//! Assignment edges between products/components and functionalities.

use crate::context::Context;
use crate::cypher;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Graph, QueryExt};
use crate::models::now_timestamp;

const ASSIGN_TO_PRODUCT: &str = "MATCH (p:Product {code: $owner_code})
     MATCH (f:Functionality {code: $functionality_code})
     MERGE (p)-[r:ASIGNACION_FUNCIONALIDAD]->(f)
     ON CREATE SET r.created_at = $now
     RETURN count(r) AS assigned";

const ASSIGN_TO_COMPONENT: &str = "MATCH (c:Component {code: $owner_code})
     MATCH (f:Functionality {code: $functionality_code})
     MERGE (c)-[r:ASIGNACION_FUNCIONALIDAD]->(f)
     ON CREATE SET r.created_at = $now
     RETURN count(r) AS assigned";

const REMOVE_FROM_PRODUCT: &str =
    "MATCH (:Product {code: $owner_code})-[r:ASIGNACION_FUNCIONALIDAD]->(:Functionality {code: $functionality_code})
     DELETE r
     RETURN count(r) AS removed";

const REMOVE_FROM_COMPONENT: &str =
    "MATCH (:Component {code: $owner_code})-[r:ASIGNACION_FUNCIONALIDAD]->(:Functionality {code: $functionality_code})
     DELETE r
     RETURN count(r) AS removed";

/// Repository for `ASIGNACION_FUNCIONALIDAD` edges.
///
/// Creation is a MERGE, so assigning twice leaves a single edge.
#[derive(FromContext, Clone)]
pub struct AssignmentRepository {
    graph: Graph,
}

impl AssignmentRepository {
    /// Returns whether the edge exists afterwards.
    pub async fn assign_to_product(
        &self,
        product_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        self.merge_edge(ASSIGN_TO_PRODUCT, product_code, functionality_code)
            .await
    }

    pub async fn assign_to_component(
        &self,
        component_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        self.merge_edge(ASSIGN_TO_COMPONENT, component_code, functionality_code)
            .await
    }

    /// Returns whether an edge was actually removed.
    pub async fn remove_from_product(
        &self,
        product_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        self.delete_edge(REMOVE_FROM_PRODUCT, product_code, functionality_code)
            .await
    }

    pub async fn remove_from_component(
        &self,
        component_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        self.delete_edge(REMOVE_FROM_COMPONENT, component_code, functionality_code)
            .await
    }

    async fn merge_edge(
        &self,
        cypher: &str,
        owner_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        let assigned: Option<i64> = cypher!(
            self.graph,
            cypher,
            owner_code = owner_code,
            functionality_code = functionality_code,
            now = now_timestamp(),
        )
        .fetch_value("assigned")
        .await?;

        Ok(assigned.unwrap_or(0) > 0)
    }

    async fn delete_edge(
        &self,
        cypher: &str,
        owner_code: &str,
        functionality_code: &str,
    ) -> Result<bool, AppError> {
        let removed: Option<i64> = cypher!(
            self.graph,
            cypher,
            owner_code = owner_code,
            functionality_code = functionality_code,
        )
        .fetch_value("removed")
        .await?;

        Ok(removed.unwrap_or(0) > 0)
    }
}

//! Uniqueness constraints on every business key.

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::graph::{Graph, QueryExt};
use crate::repositories::CONSTRAINTS;

use super::Migration;

pub struct M001Constraints;

impl Migration for M001Constraints {
    fn id(&self) -> &'static str {
        "m001_constraints"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "Uniqueness constraints for product, functionality, component, incident and resolution keys"
    }

    fn up<'a>(&'a self, graph: &'a Graph) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            for (name, statement) in CONSTRAINTS {
                tracing::debug!(constraint = %name, "Creating constraint");
                graph.query(statement).run().await?;
            }
            Ok(())
        })
    }
}

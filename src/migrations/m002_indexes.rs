//! Range index backing the newest-first incident listings.

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::graph::{Graph, QueryExt};

use super::Migration;

pub struct M002Indexes;

impl Migration for M002Indexes {
    fn id(&self) -> &'static str {
        "m002_indexes"
    }

    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Index on Incident.created_at"
    }

    fn up<'a>(&'a self, graph: &'a Graph) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            graph
                .query(
                    "CREATE INDEX incident_created_at IF NOT EXISTS
                     FOR (i:Incident) ON (i.created_at)",
                )
                .run()
                .await
        })
    }
}

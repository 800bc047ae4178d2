//! Graph access layer.
//!
//! Repositories talk to the store through [`Graph`], a cheap-to-clone handle
//! over any [`CypherExecutor`]. Production wires in the Neo4j backend; tests
//! wire in scripted executors.
//!
//! # Usage
//!
//! ```ignore
//! use ontograph::graph::{Graph, QueryExt};
//!
//! let graph = Graph::connect(&config.neo4j).await?;
//!
//! let row = graph
//!     .query("MATCH (p:Product {code: $code}) RETURN p {.*} AS p")
//!     .param("code", "ERP")
//!     .fetch_one()
//!     .await?;
//!
//! graph
//!     .query("MATCH (p:Product {code: $code}) DETACH DELETE p")
//!     .param("code", "ERP")
//!     .run()
//!     .await?;
//! ```

mod macros;
mod query;
mod row;
mod traits;

pub mod backends;

pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use traits::CypherExecutor;

// Re-export macro (defined at crate root via #[macro_export])
#[doc(inline)]
pub use crate::cypher;

use std::sync::Arc;

use crate::config::Neo4jConfig;
use crate::error::AppError;
use backends::Neo4jClient;

/// Shared handle to the graph store.
#[derive(Clone)]
pub struct Graph {
    executor: Arc<dyn CypherExecutor>,
}

impl Graph {
    /// Wraps any executor.
    pub fn new(executor: impl CypherExecutor + 'static) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    /// Wraps an executor that is already shared, e.g. a test double the
    /// caller wants to inspect afterwards.
    pub fn from_arc(executor: Arc<dyn CypherExecutor>) -> Self {
        Self { executor }
    }

    /// Connects to Neo4j.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, AppError> {
        Ok(Self::new(Neo4jClient::connect(config).await?))
    }

    /// Round-trips a trivial statement to check the store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        let ok: Option<i64> = self.query("RETURN 1 AS ok").fetch_value("ok").await?;
        match ok {
            Some(1) => Ok(()),
            other => Err(AppError::Integrity(format!(
                "unexpected ping response: {:?}",
                other
            ))),
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl CypherExecutor for Graph {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        self.executor.execute_cypher(cypher, params).await
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.executor.run_cypher(cypher, params).await
    }
}

//! Core trait for graph database access.
//!
//! Every backend implements [`CypherExecutor`]. The ontology layer only ever
//! sees this trait, which keeps repositories testable against scripted
//! executors and free of driver types.

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::row::{Params, RowStream};

/// Executes Cypher queries against a graph database.
///
/// Each call is a single auto-committed statement; no multi-statement
/// transaction is ever opened through this trait.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes a Cypher query and returns a stream of result rows.
    ///
    /// Use this for queries that return data (MATCH ... RETURN, MERGE ... RETURN).
    async fn execute_cypher(&self, cypher: &str, params: Params)
        -> Result<RowStream<'_>, AppError>;

    /// Executes a Cypher statement without returning results.
    ///
    /// Use this for mutations and DDL (CREATE CONSTRAINT, DELETE).
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError>;
}

//! Application context providing the dependency injection root.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::error::AppError;
use crate::graph::Graph;

/// Root application context.
///
/// `#[derive(Context)]` generates a `FromRef` implementation per field, so
/// repositories and services resolve their dependencies at compile time.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Shared handle to the graph store.
    pub graph: Graph,
    pub config: Arc<Config>,
    pub auth: Arc<AuthGate>,
    #[context(skip)]
    pub started_at: Instant,
}

impl Context {
    /// Creates a context from already-built parts.
    pub fn new(graph: Graph, config: Config, auth: AuthGate) -> Self {
        Self {
            graph,
            config: Arc::new(config),
            auth: Arc::new(auth),
            started_at: Instant::now(),
        }
    }

    /// Validates the configuration, connects to Neo4j and builds the auth gate.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        let auth = AuthGate::new(&config.auth)?;
        let graph = Graph::connect(&config.neo4j).await?;
        Ok(Self::new(graph, config, auth))
    }

    /// Seconds since the context was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

//! Graph database backends.
//!
//! A backend only has to implement [`CypherExecutor`](crate::graph::CypherExecutor);
//! [`Graph`](crate::graph::Graph) erases the concrete type behind an `Arc`.
//!
//! | Backend | Module |
//! |---------|--------|
//! | Neo4j (Bolt) | [`neo4j`] |

pub mod neo4j;

pub use neo4j::Neo4jClient;

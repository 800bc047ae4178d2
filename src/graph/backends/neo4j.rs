//! Neo4j backend over the Bolt protocol.
//!
//! Parameters travel as JSON and are converted to Bolt values on the way in.
//! Rows come back as JSON maps; queries are expected to project node
//! properties (`n {.*}`) rather than returning raw nodes.

use async_trait::async_trait;
use neo4rs::{
    BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
    ConfigBuilder,
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::config::Neo4jConfig;
use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::CypherExecutor;

/// Pooled Neo4j connection. Clone is cheap.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: neo4rs::Graph,
    uri: String,
}

impl Neo4jClient {
    /// Connects to Neo4j with the configured credentials and pool settings.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, AppError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.username)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(config.fetch_size)
            .build()?;

        let graph = neo4rs::Graph::connect(neo_config).await?;

        tracing::info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self {
            graph,
            uri: config.uri.clone(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn build_query(cypher: &str, params: Params) -> neo4rs::Query {
        params
            .into_iter()
            .fold(neo4rs::query(cypher), |q, (key, value)| {
                q.param(&key, json_to_bolt(value))
            })
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        tracing::debug!(cypher = %cypher, params = params.len(), "execute");

        let query = Self::build_query(cypher, params);
        let mut result = self.graph.execute(query).await.map_err(|e| AppError::Query {
            message: e.to_string(),
            query: cypher.to_string(),
        })?;

        let cypher = cypher.to_string();
        let stream = async_stream::try_stream! {
            while let Some(row) = result.next().await? {
                let data: HashMap<String, JsonValue> =
                    row.to().map_err(|e| AppError::Query {
                        message: format!("failed to decode row: {}", e),
                        query: cypher.clone(),
                    })?;
                yield Row::new(data);
            }
        };

        Ok(Box::pin(stream))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        tracing::debug!(cypher = %cypher, params = params.len(), "run");

        let query = Self::build_query(cypher, params);
        self.graph.run(query).await.map_err(|e| AppError::Query {
            message: e.to_string(),
            query: cypher.to_string(),
        })
    }
}

/// Converts a JSON parameter into the equivalent Bolt value.
///
/// Unsigned integers beyond `i64::MAX` degrade to floats.
pub fn json_to_bolt(value: JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::Boolean(BoltBoolean::new(b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(BoltInteger::new(i)),
            None => BoltType::Float(BoltFloat::new(n.as_f64().unwrap_or(f64::NAN))),
        },
        JsonValue::String(s) => BoltType::String(BoltString::new(&s)),
        JsonValue::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(json_to_bolt(item));
            }
            BoltType::List(list)
        }
        JsonValue::Object(map) => {
            let mut bolt = BoltMap::new();
            for (key, value) in map {
                bolt.put(BoltString::new(&key), json_to_bolt(value));
            }
            BoltType::Map(bolt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_bolt_scalars() {
        assert!(matches!(json_to_bolt(json!(null)), BoltType::Null(_)));
        assert!(matches!(json_to_bolt(json!(true)), BoltType::Boolean(_)));
        assert!(matches!(json_to_bolt(json!(50)), BoltType::Integer(_)));
        assert!(matches!(json_to_bolt(json!(0.5)), BoltType::Float(_)));
        assert!(matches!(json_to_bolt(json!("ERP")), BoltType::String(_)));
    }

    #[test]
    fn test_json_to_bolt_large_unsigned_is_float() {
        assert!(matches!(json_to_bolt(json!(u64::MAX)), BoltType::Float(_)));
    }

    #[test]
    fn test_json_to_bolt_nested() {
        let bolt = json_to_bolt(json!({"codes": ["ERP", "CRM"], "limit": 10}));

        match bolt {
            BoltType::Map(map) => {
                assert_eq!(map.value.len(), 2);
                match map.value.get(&BoltString::new("codes")) {
                    Some(BoltType::List(list)) => assert_eq!(list.value.len(), 2),
                    other => panic!("expected list, got {:?}", other),
                }
            }
            other => panic!("expected map, got {:?}", other),
        }
    }
}

//! Query builder for fluent Cypher query construction.

use futures::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::traits::CypherExecutor;

/// A builder for constructing and executing Cypher queries.
///
/// # Example
///
/// ```ignore
/// let row = graph
///     .query("MATCH (p:Product {code: $code}) RETURN p {.*} AS p")
///     .param("code", "ERP")
///     .fetch_one()
///     .await?;
/// ```
pub struct Query<'a, E: CypherExecutor + ?Sized> {
    executor: &'a E,
    cypher: String,
    params: Params,
    error: Option<AppError>,
}

impl<'a, E: CypherExecutor + ?Sized> Query<'a, E> {
    pub fn new(executor: &'a E, cypher: &str) -> Self {
        Self {
            executor,
            cypher: cypher.to_string(),
            params: Params::new(),
            error: None,
        }
    }

    /// Adds a parameter to the query, referenced in Cypher as `$name`.
    ///
    /// A value that fails to serialize is reported when the query executes.
    pub fn param<T: Serialize>(mut self, name: &str, value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(json_value) => {
                self.params.insert(name.to_string(), json_value);
            }
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(AppError::Internal(format!(
                        "failed to serialize parameter '{}': {}",
                        name, e
                    )));
                }
            }
        }
        self
    }

    /// Adds a parameter that's already a JSON value.
    pub fn param_raw(mut self, name: &str, value: JsonValue) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    /// The Cypher text of this query.
    pub fn cypher(&self) -> &str {
        &self.cypher
    }

    fn into_parts(self) -> Result<(&'a E, String, Params), AppError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.executor, self.cypher, self.params)),
        }
    }

    /// Executes the query and returns a stream of rows.
    pub async fn execute(self) -> Result<RowStream<'a>, AppError> {
        let (executor, cypher, params) = self.into_parts()?;
        executor.execute_cypher(&cypher, params).await
    }

    /// Executes the query and collects all rows into a vector.
    pub async fn fetch_all(self) -> Result<Vec<Row>, AppError> {
        self.execute().await?.try_collect().await
    }

    /// Executes the query and returns the first row, if any.
    pub async fn fetch_one(self) -> Result<Option<Row>, AppError> {
        let mut stream = self.execute().await?;
        stream.next().await.transpose()
    }

    /// Executes the query and reads a single column of the first row.
    ///
    /// Returns `None` when the query yields no rows or the value is null.
    pub async fn fetch_value<T: DeserializeOwned>(
        self,
        column: &str,
    ) -> Result<Option<T>, AppError> {
        match self.fetch_one().await? {
            Some(row) => row.get_opt(column),
            None => Ok(None),
        }
    }

    /// Executes the query without returning results.
    pub async fn run(self) -> Result<(), AppError> {
        let (executor, cypher, params) = self.into_parts()?;
        executor.run_cypher(&cypher, params).await
    }
}

/// Extension trait providing `executor.query("...")`.
pub trait QueryExt: CypherExecutor {
    fn query(&self, cypher: &str) -> Query<'_, Self>
    where
        Self: Sized,
    {
        Query::new(self, cypher)
    }
}

impl<E: CypherExecutor> QueryExt for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct MockExecutor {
        expected_cypher: String,
        expected_params: Params,
        rows: Vec<Row>,
    }

    impl MockExecutor {
        fn new(cypher: &str, params: Params) -> Self {
            Self {
                expected_cypher: cypher.to_string(),
                expected_params: params,
                rows: Vec::new(),
            }
        }
    }

    #[async_trait::async_trait]
    impl CypherExecutor for MockExecutor {
        async fn execute_cypher(
            &self,
            cypher: &str,
            params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            assert_eq!(cypher, self.expected_cypher);
            assert_eq!(params, self.expected_params);
            let rows: Vec<Result<Row, AppError>> = self.rows.iter().cloned().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(rows)))
        }

        async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
            assert_eq!(cypher, self.expected_cypher);
            assert_eq!(params, self.expected_params);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_query_no_params() {
        let executor = MockExecutor::new("MATCH (p:Product) RETURN p {.*} AS p", HashMap::new());

        let rows = executor
            .query("MATCH (p:Product) RETURN p {.*} AS p")
            .fetch_all()
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_query_with_params() {
        let mut expected_params = HashMap::new();
        expected_params.insert("query".to_string(), json!("erp"));
        expected_params.insert("limit".to_string(), json!(50));

        let executor = MockExecutor::new(
            "MATCH (p:Product) WHERE toLower(p.code) CONTAINS toLower($query) RETURN p LIMIT $limit",
            expected_params,
        );

        let result = executor
            .query("MATCH (p:Product) WHERE toLower(p.code) CONTAINS toLower($query) RETURN p LIMIT $limit")
            .param("query", "erp")
            .param("limit", 50)
            .fetch_all()
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_query_run() {
        let mut expected_params = HashMap::new();
        expected_params.insert("code".to_string(), json!("ERP"));

        let executor = MockExecutor::new(
            "MATCH (p:Product {code: $code}) DETACH DELETE p",
            expected_params,
        );

        let result = executor
            .query("MATCH (p:Product {code: $code}) DETACH DELETE p")
            .param("code", "ERP")
            .run()
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_value_reads_first_row() {
        let mut executor = MockExecutor::new("RETURN 2 AS deleted", HashMap::new());
        executor.rows = vec![Row::from(json!({"deleted": 2}))];

        let deleted: Option<i64> = executor
            .query("RETURN 2 AS deleted")
            .fetch_value("deleted")
            .await
            .unwrap();
        assert_eq!(deleted, Some(2));
    }

    #[tokio::test]
    async fn test_unserializable_param_fails_on_execute() {
        let executor = MockExecutor::new("RETURN $bad", HashMap::new());

        let mut bad = HashMap::new();
        bad.insert(vec![1u8], "non-string keys are not valid JSON objects");

        let result = executor.query("RETURN $bad").param("bad", bad).run().await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}

//! Shorthand for parameterized Cypher queries.

/// Builds a [`Query`](crate::graph::Query) with named parameters.
///
/// ```ignore
/// use ontograph::graph::cypher;
///
/// cypher!(
///     graph,
///     "MATCH (p:Product {code: $product_code}), (f:Functionality {code: $functionality_code})
///      MERGE (p)-[:ASIGNACION]->(f)",
///     product_code = "ERP",
///     functionality_code = "AUTH",
/// )
/// .run()
/// .await?;
/// ```
#[macro_export]
macro_rules! cypher {
    ($graph:expr, $query:expr) => {
        $graph.query($query)
    };
    ($graph:expr, $query:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $graph.query($query)$(.param(stringify!($name), $value))+
    };
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::AppError;
    use crate::graph::query::QueryExt;
    use crate::graph::row::{Params, RowStream};
    use crate::graph::traits::CypherExecutor;

    struct ExpectParams(Params);

    #[async_trait::async_trait]
    impl CypherExecutor for ExpectParams {
        async fn execute_cypher(
            &self,
            _cypher: &str,
            params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            assert_eq!(params, self.0);
            Ok(Box::pin(futures::stream::empty()))
        }

        async fn run_cypher(&self, _cypher: &str, params: Params) -> Result<(), AppError> {
            assert_eq!(params, self.0);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cypher_macro_no_params() {
        let executor = ExpectParams(Params::new());
        cypher!(executor, "MATCH (p:Product) RETURN p").run().await.unwrap();
    }

    #[tokio::test]
    async fn test_cypher_macro_binds_named_params() {
        let mut expected = Params::new();
        expected.insert("product_code".into(), json!("ERP"));
        expected.insert("limit".into(), json!(10));
        let executor = ExpectParams(expected);

        cypher!(
            executor,
            "MATCH (p:Product {code: $product_code}) RETURN p LIMIT $limit",
            product_code = "ERP",
            limit = 10,
        )
        .fetch_all()
        .await
        .unwrap();
    }
}

//! Ontology manager behaviour against a scripted graph executor.
//!
//! The executor answers each statement with the rows of the first rule whose
//! needle occurs in the Cypher text, and records every statement it sees.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use ontograph::auth::{AuthGate, UserStore};
use ontograph::config::{AuthConfig, Config};
use ontograph::context::Context;
use ontograph::error::AppError;
use ontograph::graph::{CypherExecutor, Graph, Params, Row, RowStream};
use ontograph::models::{ProductUpdate, SlaLevel, UpdateOutcome};
use ontograph::services::OntologyManager;
use ontograph::FromRef;

const CREATED_AT: &str = "2024-01-15T10:30:00.000000Z";

#[derive(Default)]
struct ScriptedExecutor {
    rules: Vec<(&'static str, Vec<Row>)>,
    log: Mutex<Vec<(String, Params)>>,
}

impl ScriptedExecutor {
    fn new() -> Self {
        Self::default()
    }

    fn on(mut self, needle: &'static str, rows: Vec<serde_json::Value>) -> Self {
        self.rules
            .push((needle, rows.into_iter().map(Row::from).collect()));
        self
    }

    fn statements(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .map(|(cypher, _)| cypher.clone())
            .collect()
    }

    fn params_of(&self, needle: &str) -> Option<Params> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .find(|(cypher, _)| cypher.contains(needle))
            .map(|(_, params)| params.clone())
    }

    fn respond(&self, cypher: &str, params: Params) -> Vec<Row> {
        self.log.lock().unwrap().push((cypher.to_string(), params));
        self.rules
            .iter()
            .find(|(needle, _)| cypher.contains(needle))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CypherExecutor for ScriptedExecutor {
    async fn execute_cypher(&self, cypher: &str, params: Params) -> Result<RowStream<'_>, AppError> {
        let rows: Vec<Result<Row, AppError>> =
            self.respond(cypher, params).into_iter().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(rows)))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.respond(cypher, params);
        Ok(())
    }
}

fn manager(executor: Arc<ScriptedExecutor>) -> OntologyManager {
    let auth_config = AuthConfig {
        enabled: false,
        ..AuthConfig::default()
    };
    let gate = AuthGate::with_users(&auth_config, UserStore::with_cost(4).unwrap()).unwrap();
    let ctx = Context::new(Graph::from_arc(executor), Config::default(), gate);
    OntologyManager::from_ref(&ctx)
}

fn product(code: &str, name: &str) -> serde_json::Value {
    json!({"code": code, "name": name, "created_at": CREATED_AT})
}

#[tokio::test]
async fn test_create_product_merges_by_code() {
    let executor = Arc::new(
        ScriptedExecutor::new().on("MERGE (p:Product", vec![json!({"p": product("ERP", "ERP System")})]),
    );

    let created = manager(executor.clone())
        .create_product("  ERP ", "ERP System")
        .await
        .unwrap();

    assert_eq!(created.code, "ERP");
    let params = executor.params_of("MERGE (p:Product").unwrap();
    assert_eq!(params["code"], json!("ERP"));
    assert_eq!(params["name"], json!("ERP System"));
}

#[tokio::test]
async fn test_create_product_rejects_long_code_without_store_call() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .create_product("ABCDEFGHIJKLMNOPQRSTU", "Too long")
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_incident_under_missing_functionality_is_parent_not_found() {
    // The guarded MERGE matches nothing and returns no row.
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .create_incident("INC1", "Login fails", "SLA_HIGH", "NOPE")
        .await;

    match result {
        Err(AppError::ParentNotFound { kind, code }) => {
            assert_eq!(kind, "Functionality");
            assert_eq!(code, "NOPE");
        }
        other => panic!("expected ParentNotFound, got {:?}", other),
    }
    let statements = executor.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].starts_with("MATCH (f:Functionality {code: $functionality_code})"));
}

#[tokio::test]
async fn test_unknown_sla_is_rejected_before_the_store() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .create_incident("INC1", "Login fails", "SLA_URGENT", "AUTH")
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_incident_keeps_stored_sla_form() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "MERGE (i:Incident",
        vec![json!({"i": {
            "code": "INC1",
            "description": "Login fails",
            "sla_level": "SLA_HIGH",
            "created_at": CREATED_AT
        }})],
    ));

    let incident = manager(executor.clone())
        .create_incident("INC1", "Login fails", "high", "AUTH")
        .await
        .unwrap();

    assert_eq!(incident.sla_level, SlaLevel::High);
    assert_eq!(incident.sla_level.as_str(), "SLA_HIGH");
    let params = executor.params_of("MERGE (i:Incident").unwrap();
    assert_eq!(params["sla_level"], json!("SLA_HIGH"));
}

#[tokio::test]
async fn test_resolution_with_bad_date_is_validation_error() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .create_resolution("INC1", "yesterday", "Restarted the service")
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_resolution_for_missing_incident_is_parent_not_found() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .create_resolution("INC404", "2024-01-15T10:30:00Z", "Restarted the service")
        .await;

    assert!(matches!(
        result,
        Err(AppError::ParentNotFound { kind: "Incident", .. })
    ));
    assert_eq!(executor.statements().len(), 1);
}

#[tokio::test]
async fn test_assign_to_missing_product_is_not_found() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .assign_functionality_to_product("NOPE", "AUTH")
        .await;

    assert!(matches!(result, Err(AppError::NotFound { kind: "Product", .. })));
    assert!(executor
        .statements()
        .iter()
        .all(|s| !s.contains("MERGE")));
}

#[tokio::test]
async fn test_assign_to_missing_functionality_is_not_found() {
    let executor = Arc::new(
        ScriptedExecutor::new().on("MATCH (p:Product {code: $code}) RETURN", vec![json!({"p": product("ERP", "ERP")})]),
    );

    let result = manager(executor.clone())
        .assign_functionality_to_product("ERP", "NOPE")
        .await;

    assert!(matches!(
        result,
        Err(AppError::NotFound { kind: "Functionality", .. })
    ));
}

#[tokio::test]
async fn test_removing_unassigned_pair_is_false() {
    let executor = Arc::new(ScriptedExecutor::new().on("AS removed", vec![json!({"removed": 0})]));

    let removed = manager(executor)
        .remove_functionality_from_product("ERP", "AUTH")
        .await
        .unwrap();

    assert!(!removed);
}

#[tokio::test]
async fn test_new_product_has_no_functionalities_or_incidents() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "collect(DISTINCT f {.*}) AS functionalities",
        vec![json!({
            "p": product("ERP", "ERP System"),
            "functionalities": [],
            "incidents": [],
            "resolutions": []
        })],
    ));

    let details = manager(executor)
        .get_product_with_functionalities("ERP")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(details.product.code, "ERP");
    assert_eq!(details.functionalities.len(), 0);
    assert_eq!(details.incidents.len(), 0);
}

#[tokio::test]
async fn test_empty_update_touches_nothing() {
    let executor = Arc::new(ScriptedExecutor::new());

    let outcome = manager(executor.clone())
        .update_product("ERP", ProductUpdate::default())
        .await
        .unwrap();

    assert_eq!(outcome, UpdateOutcome::NoChanges);
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_update_of_missing_product_is_not_found() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor)
        .update_product(
            "NOPE",
            ProductUpdate {
                name: Some("New".into()),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound { kind: "Product", .. })));
}

#[tokio::test]
async fn test_update_sets_only_allow_listed_fields() {
    let executor = Arc::new(
        ScriptedExecutor::new().on("SET p.name = $name", vec![json!({"p": product("ERP", "ERP v2")})]),
    );

    let outcome = manager(executor.clone())
        .update_product(
            "ERP",
            ProductUpdate {
                name: Some("ERP v2".into()),
            },
        )
        .await
        .unwrap();

    match outcome {
        UpdateOutcome::Updated(p) => assert_eq!(p.name, "ERP v2"),
        UpdateOutcome::NoChanges => panic!("expected an update"),
    }
    let statement = executor.statements().remove(0);
    assert!(statement.contains("p.updated_at = $now"));
}

#[tokio::test]
async fn test_delete_missing_product_is_false() {
    let executor = Arc::new(ScriptedExecutor::new().on("AS deleted", vec![json!({"deleted": 0})]));

    assert!(!manager(executor).delete_product("NOPE").await.unwrap());
}

#[tokio::test]
async fn test_lookups_trim_codes_like_writes() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .on(
                "MATCH (p:Product {code: $code}) RETURN",
                vec![json!({"p": product("ERP", "ERP System")})],
            )
            .on("AS deleted", vec![json!({"deleted": 1})]),
    );
    let manager = manager(executor.clone());

    let found = manager.get_product(" ERP ").await.unwrap().unwrap();
    assert_eq!(found.code, "ERP");
    let params = executor
        .params_of("MATCH (p:Product {code: $code}) RETURN")
        .unwrap();
    assert_eq!(params["code"], json!("ERP"));

    assert!(manager.delete_product(" ERP ").await.unwrap());
    let params = executor.params_of("AS deleted").unwrap();
    assert_eq!(params["code"], json!("ERP"));
}

#[tokio::test]
async fn test_assign_reports_trimmed_code_when_missing() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor)
        .assign_functionality_to_product(" NOPE ", "AUTH")
        .await;

    match result {
        Err(AppError::NotFound { kind, code }) => {
            assert_eq!(kind, "Product");
            assert_eq!(code, "NOPE");
        }
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_lookup_with_overlong_code_is_rejected_before_the_store() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .get_functionality("ABCDEFGHIJKLMNOPQRSTU")
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(executor.statements().is_empty());
}

#[tokio::test]
async fn test_bulk_assign_to_missing_product_is_not_found() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .assign_functionalities_to_product("NOPE", &[])
        .await;

    assert!(matches!(result, Err(AppError::NotFound { kind: "Product", .. })));
    assert!(executor
        .statements()
        .iter()
        .all(|s| !s.contains("MERGE")));
}

#[tokio::test]
async fn test_bulk_remove_from_missing_product_is_not_found() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone())
        .remove_functionalities_from_product("NOPE", &["AUTH".to_string()])
        .await;

    assert!(matches!(result, Err(AppError::NotFound { kind: "Product", .. })));
    assert!(executor
        .statements()
        .iter()
        .all(|s| !s.contains("DELETE")));
}

#[tokio::test]
async fn test_bulk_assign_collects_unknown_functionalities() {
    let executor = Arc::new(ScriptedExecutor::new().on(
        "MATCH (p:Product {code: $code}) RETURN",
        vec![json!({"p": product("ERP", "ERP")})],
    ));
    let codes = vec!["GHOST".to_string(), "ABCDEFGHIJKLMNOPQRSTU".to_string()];

    let outcome = manager(executor.clone())
        .assign_functionalities_to_product("ERP", &codes)
        .await
        .unwrap();

    assert!(outcome.successful.is_empty());
    assert_eq!(outcome.requested(), 2);
    assert_eq!(outcome.failed[0].functionality_code, "GHOST");
    assert!(outcome.failed[0].reason.contains("Functionality"));
    assert!(outcome.failed[1].reason.contains("Validation"));
    assert!(executor
        .statements()
        .iter()
        .all(|s| !s.contains("MERGE")));
}

#[tokio::test]
async fn test_bulk_assign_counts_unconfirmed_edge_as_failure() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .on(
                "MATCH (p:Product {code: $code}) RETURN",
                vec![json!({"p": product("ERP", "ERP")})],
            )
            .on(
                "MATCH (f:Functionality {code: $code}) RETURN",
                vec![json!({"f": {"code": "AUTH", "name": "Auth", "created_at": CREATED_AT}})],
            )
            .on("AS assigned", vec![json!({"assigned": 0})]),
    );

    let outcome = manager(executor)
        .assign_functionalities_to_product("ERP", &["AUTH".to_string()])
        .await
        .unwrap();

    assert!(outcome.successful.is_empty());
    assert_eq!(outcome.failed.len(), 1);
}

#[tokio::test]
async fn test_bulk_remove_reports_unassigned_pairs() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .on(
                "MATCH (p:Product {code: $code}) RETURN",
                vec![json!({"p": product("ERP", "ERP")})],
            )
            .on("AS removed", vec![json!({"removed": 0})]),
    );

    let outcome = manager(executor)
        .remove_functionalities_from_product("ERP", &["AUTH".to_string()])
        .await
        .unwrap();

    assert!(outcome.successful.is_empty());
    assert_eq!(outcome.failed[0].reason, "'AUTH' is not assigned to 'ERP'");
}

#[tokio::test]
async fn test_require_product_is_not_found_before_any_update() {
    let executor = Arc::new(ScriptedExecutor::new());

    let result = manager(executor.clone()).require_product("NOPE").await;

    assert!(matches!(result, Err(AppError::NotFound { kind: "Product", .. })));
    assert!(executor.statements().iter().all(|s| !s.contains("SET")));
}

#[tokio::test]
async fn test_describe_schema_keeps_labels_without_properties() {
    let executor = Arc::new(
        ScriptedExecutor::new()
            .on(
                "UNWIND labels(n) AS label",
                vec![
                    json!({"label": "Marker", "properties": []}),
                    json!({"label": "Product", "properties": ["name", "code"]}),
                ],
            )
            .on(
                "type(r) AS type",
                vec![json!({"type": "ASIGNACION_FUNCIONALIDAD"})],
            ),
    );

    let description = manager(executor.clone()).describe_schema().await.unwrap();

    assert!(description.contains("  Marker: \n"));
    assert!(description.contains("  Product: code, name\n"));
    assert!(description.contains("  ASIGNACION_FUNCIONALIDAD\n"));
    assert!(executor
        .statements()
        .iter()
        .any(|s| s.contains("size(keys(n)) = 0")));
}

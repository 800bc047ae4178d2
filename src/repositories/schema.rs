//! Schema repository: constraints, schema description, version tracking and
//! bulk cleanup.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{Graph, QueryExt};
use crate::models::now_timestamp;

/// Uniqueness constraints on every business key.
pub const CONSTRAINTS: &[(&str, &str)] = &[
    (
        "product_code_unique",
        "CREATE CONSTRAINT product_code_unique IF NOT EXISTS FOR (p:Product) REQUIRE p.code IS UNIQUE",
    ),
    (
        "functionality_code_unique",
        "CREATE CONSTRAINT functionality_code_unique IF NOT EXISTS FOR (f:Functionality) REQUIRE f.code IS UNIQUE",
    ),
    (
        "component_code_unique",
        "CREATE CONSTRAINT component_code_unique IF NOT EXISTS FOR (c:Component) REQUIRE c.code IS UNIQUE",
    ),
    (
        "incident_code_unique",
        "CREATE CONSTRAINT incident_code_unique IF NOT EXISTS FOR (i:Incident) REQUIRE i.code IS UNIQUE",
    ),
    (
        "resolution_incident_code_unique",
        "CREATE CONSTRAINT resolution_incident_code_unique IF NOT EXISTS FOR (r:Resolution) REQUIRE r.incident_code IS UNIQUE",
    ),
];

/// Deletion statements for `clear_all`, children before parents.
const CLEAR_STEPS: &[(&str, &str)] = &[
    (
        "resolutions",
        "MATCH (r:Resolution) DETACH DELETE r RETURN count(r) AS deleted",
    ),
    (
        "incidents",
        "MATCH (i:Incident) DETACH DELETE i RETURN count(i) AS deleted",
    ),
    (
        "assignments",
        "MATCH ()-[a:ASIGNACION_FUNCIONALIDAD]->() DELETE a RETURN count(a) AS deleted",
    ),
    (
        "functionalities",
        "MATCH (f:Functionality) DETACH DELETE f RETURN count(f) AS deleted",
    ),
    (
        "components",
        "MATCH (c:Component) DETACH DELETE c RETURN count(c) AS deleted",
    ),
    (
        "products",
        "MATCH (p:Product) DETACH DELETE p RETURN count(p) AS deleted",
    ),
];

/// How many items each `clear_all` step removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClearReport {
    pub resolutions: i64,
    pub incidents: i64,
    pub assignments: i64,
    pub functionalities: i64,
    pub components: i64,
    pub products: i64,
}

impl ClearReport {
    fn record(&mut self, step: &str, deleted: i64) {
        match step {
            "resolutions" => self.resolutions = deleted,
            "incidents" => self.incidents = deleted,
            "assignments" => self.assignments = deleted,
            "functionalities" => self.functionalities = deleted,
            "components" => self.components = deleted,
            "products" => self.products = deleted,
            _ => {}
        }
    }

    pub fn total(&self) -> i64 {
        self.resolutions
            + self.incidents
            + self.assignments
            + self.functionalities
            + self.components
            + self.products
    }
}

/// Node and relationship counts by label / type.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub nodes: BTreeMap<String, i64>,
    pub relationships: BTreeMap<String, i64>,
}

#[derive(FromContext, Clone)]
pub struct SchemaRepository {
    graph: Graph,
}

impl SchemaRepository {
    /// Creates every uniqueness constraint. Safe to call repeatedly.
    pub async fn create_constraints(&self) -> Result<(), AppError> {
        for (name, statement) in CONSTRAINTS {
            tracing::debug!(constraint = %name, "Ensuring constraint");
            self.graph.query(statement).run().await?;
        }
        tracing::info!(count = CONSTRAINTS.len(), "Database constraints ensured");
        Ok(())
    }

    /// Names of the constraints currently defined in the database.
    pub async fn constraint_names(&self) -> Result<Vec<String>, AppError> {
        let rows = self
            .graph
            .query("SHOW CONSTRAINTS YIELD name RETURN name ORDER BY name")
            .fetch_all()
            .await?;

        rows.iter().map(|row| row.get("name")).collect()
    }

    /// Textual description of labels, their property keys and relationship types.
    pub async fn describe(&self) -> Result<String, AppError> {
        let label_rows = self
            .graph
            .query(
                "MATCH (n)
                 UNWIND labels(n) AS label
                 UNWIND CASE WHEN size(keys(n)) = 0 THEN [null] ELSE keys(n) END AS key
                 WITH label, collect(DISTINCT key) AS properties
                 RETURN label, properties
                 ORDER BY label",
            )
            .fetch_all()
            .await?;

        let rel_rows = self
            .graph
            .query("MATCH ()-[r]->() RETURN DISTINCT type(r) AS type ORDER BY type")
            .fetch_all()
            .await?;

        let mut out = String::from("Node labels:\n");
        for row in &label_rows {
            let label: String = row.get("label")?;
            let mut properties: Vec<String> = row.get_list("properties")?;
            properties.sort();
            out.push_str(&format!("  {}: {}\n", label, properties.join(", ")));
        }

        out.push_str("Relationship types:\n");
        for row in &rel_rows {
            let rel_type: String = row.get("type")?;
            out.push_str(&format!("  {}\n", rel_type));
        }

        Ok(out)
    }

    pub async fn stats(&self) -> Result<GraphStats, AppError> {
        let node_rows = self
            .graph
            .query(
                "MATCH (n)
                 UNWIND labels(n) AS label
                 RETURN label, count(*) AS count
                 ORDER BY label",
            )
            .fetch_all()
            .await?;

        let rel_rows = self
            .graph
            .query("MATCH ()-[r]->() RETURN type(r) AS type, count(*) AS count ORDER BY type")
            .fetch_all()
            .await?;

        let mut stats = GraphStats::default();
        for row in &node_rows {
            stats.nodes.insert(row.get("label")?, row.get("count")?);
        }
        for row in &rel_rows {
            stats.relationships.insert(row.get("type")?, row.get("count")?);
        }
        Ok(stats)
    }

    /// Deletes the whole ontology, children before parents.
    pub async fn clear_all(&self) -> Result<ClearReport, AppError> {
        let mut report = ClearReport::default();
        for (step, statement) in CLEAR_STEPS {
            let deleted: Option<i64> = self.graph.query(statement).fetch_value("deleted").await?;
            let deleted = deleted.unwrap_or(0);
            tracing::debug!(step = %step, deleted, "Cleared");
            report.record(step, deleted);
        }
        tracing::info!(total = report.total(), "Ontology cleared");
        Ok(report)
    }

    /// Current schema version, 0 for a fresh database.
    pub async fn get_schema_version(&self) -> Result<u32, AppError> {
        let version: Option<i64> = self
            .graph
            .query("MATCH (sv:SchemaVersion {id: 1}) RETURN sv.version AS version")
            .fetch_value("version")
            .await?;

        Ok(version.unwrap_or(0) as u32)
    }

    pub async fn get_applied_migrations(&self) -> Result<Vec<String>, AppError> {
        let row = self
            .graph
            .query("MATCH (sv:SchemaVersion {id: 1}) RETURN sv.applied_migrations AS migrations")
            .fetch_one()
            .await?;

        match row {
            Some(row) => row.get_list("migrations"),
            None => Ok(Vec::new()),
        }
    }

    /// Records a successfully applied migration.
    pub async fn record_migration(&self, version: u32, migration_id: &str) -> Result<(), AppError> {
        self.graph
            .query(
                "MERGE (sv:SchemaVersion {id: 1})
                 ON CREATE SET sv.applied_migrations = [], sv.created_at = $now
                 SET sv.version = $version,
                     sv.applied_migrations = sv.applied_migrations + [$migration_id],
                     sv.last_applied_at = $now",
            )
            .param("version", version as i64)
            .param("migration_id", migration_id)
            .param("now", now_timestamp())
            .run()
            .await
    }
}

//! Read-only MCP resources.
//!
//! Every resource renders as `{uri, data, metadata, links}` JSON text.

use std::cmp::Ordering;

use rmcp::model::{Annotated, RawResource, ReadResourceResult, Resource, ResourceContents};
use percent_encoding::percent_decode_str;
use rmcp::ErrorData as McpError;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::error::AppError;
use crate::mcp::server::McpServer;
use crate::services::validation::MAX_PAGE_LIMIT;
use crate::services::{OntologyManager, Page};

pub const SCHEMA_TYPES: &[&str] = &["product", "functionality", "ontology"];

/// `schema://live` describes the labels and relationships actually in the graph.
pub const LIVE_SCHEMA: &str = "live";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceUri {
    Products(Page),
    Product(String),
    Functionalities(Page),
    Search(String),
    Schema(String),
    ServerInfo,
}

impl ResourceUri {
    pub fn parse(uri: &str) -> Result<Self, AppError> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| AppError::Validation(format!("not a resource URI: {}", uri)))?;

        match scheme {
            "products" => Ok(Self::Products(parse_page(rest)?)),
            "functionalities" => Ok(Self::Functionalities(parse_page(rest)?)),
            "product" if !rest.trim().is_empty() => Ok(Self::Product(rest.trim().to_string())),
            "search" if !rest.trim().is_empty() => Ok(Self::Search(decode_query(rest))),
            "schema" => Ok(Self::Schema(rest.trim().to_lowercase())),
            "server" if rest == "info" => Ok(Self::ServerInfo),
            _ => Err(AppError::not_found("Resource", uri)),
        }
    }
}

/// `{limit}_{offset}`; an empty path means the defaults.
fn parse_page(path: &str) -> Result<Page, AppError> {
    if path.is_empty() {
        return Ok(Page::default());
    }
    let invalid = || AppError::Validation(format!("expected {{limit}}_{{offset}}, got '{}'", path));
    let (limit, offset) = path.split_once('_').ok_or_else(invalid)?;
    let limit = limit.parse::<i64>().map_err(|_| invalid())?;
    let offset = offset.parse::<i64>().map_err(|_| invalid())?;
    Page::new(Some(limit), Some(offset))
}

/// Form-style decoding: `+` is a space, then percent escapes as UTF-8.
fn decode_query(raw: &str) -> String {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .trim()
        .to_string()
}

/// Relevance of an entity to a search query, in `[0, 1]`.
///
/// Exact code 1.0, code substring 0.8, exact name 0.7, name substring 0.5;
/// contributions add up and are capped at 1.0. Matching ignores case.
pub fn relevance(query: &str, code: &str, name: &str) -> f64 {
    let query = query.to_lowercase();
    let code = code.to_lowercase();
    let name = name.to_lowercase();

    let mut score = 0.0;
    if code == query {
        score += 1.0;
    } else if code.contains(&query) {
        score += 0.8;
    }
    if name == query {
        score += 0.7;
    } else if name.contains(&query) {
        score += 0.5;
    }
    f64::min(score, 1.0)
}

#[derive(Debug, Serialize)]
struct ResourceEnvelope {
    uri: String,
    data: JsonValue,
    metadata: JsonValue,
    links: JsonValue,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    #[serde(rename = "type")]
    kind: &'static str,
    code: String,
    name: String,
    score: f64,
}

fn page_links(scheme: &str, page: Page, has_more: bool) -> JsonValue {
    let mut links = serde_json::Map::new();
    links.insert(
        "self".into(),
        json!(format!("{}://{}_{}", scheme, page.limit, page.offset)),
    );
    if has_more {
        links.insert(
            "next".into(),
            json!(format!("{}://{}_{}", scheme, page.limit, page.offset + page.limit)),
        );
    }
    if page.offset > 0 {
        links.insert(
            "prev".into(),
            json!(format!(
                "{}://{}_{}",
                scheme,
                page.limit,
                page.offset.saturating_sub(page.limit)
            )),
        );
    }
    JsonValue::Object(links)
}

fn to_json(value: impl Serialize) -> Result<JsonValue, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("failed to serialize resource: {}", e)))
}

fn schema_document(kind: &str) -> Option<JsonValue> {
    match kind {
        "product" => Some(json!({
            "label": "Product",
            "properties": {
                "code": "string, unique, 1-20 characters",
                "name": "string, 1-200 characters",
                "created_at": "timestamp",
                "updated_at": "timestamp, set on update"
            },
            "relationships": ["(Product)-[:ASIGNACION_FUNCIONALIDAD]->(Functionality)"]
        })),
        "functionality" => Some(json!({
            "label": "Functionality",
            "properties": {
                "code": "string, unique, 1-20 characters",
                "name": "string, 1-200 characters",
                "created_at": "timestamp"
            },
            "relationships": [
                "(Product)-[:ASIGNACION_FUNCIONALIDAD]->(Functionality)",
                "(Component)-[:ASIGNACION_FUNCIONALIDAD]->(Functionality)",
                "(Functionality)-[:HAS_INCIDENT]->(Incident)"
            ]
        })),
        "ontology" => Some(json!({
            "nodes": ["Product", "Functionality", "Component", "Incident", "Resolution"],
            "relationships": {
                "ASIGNACION_FUNCIONALIDAD": "Product -> Functionality, Component -> Functionality",
                "HAS_INCIDENT": "Functionality -> Incident",
                "HAS_RESOLUTION": "Incident -> Resolution"
            },
            "sla_levels": ["SLA_CRITICAL", "SLA_HIGH", "SLA_MEDIUM", "SLA_LOW"]
        })),
        _ => None,
    }
}

/// Concrete resources advertised by `resources/list`.
pub fn catalog() -> Vec<Resource> {
    [
        ("products://", "Products", "Paginated product listing; use products://{limit}_{offset}"),
        ("functionalities://", "Functionalities", "Paginated functionality listing; use functionalities://{limit}_{offset}"),
        ("schema://ontology", "Ontology schema", "Node labels, relationships and SLA levels"),
        ("schema://product", "Product schema", "Product properties and relationships"),
        ("schema://functionality", "Functionality schema", "Functionality properties and relationships"),
        ("schema://live", "Live graph schema", "Labels, property keys and relationship types currently stored"),
        ("server://info", "Server info", "Server name, version, transport and auth status"),
    ]
    .into_iter()
    .map(|(uri, name, description)| {
        let mut raw = RawResource::new(uri, name);
        raw.description = Some(description.to_string());
        raw.mime_type = Some("application/json".to_string());
        Annotated::new(raw, None)
    })
    .collect()
}

async fn render(server: &McpServer, uri: &str) -> Result<ResourceEnvelope, AppError> {
    let manager = server.resolve::<OntologyManager>();

    let (data, metadata, links) = match ResourceUri::parse(uri)? {
        ResourceUri::Products(page) => {
            let (items, info) = page.apply(manager.list_products().await?);
            (to_json(items)?, to_json(info)?, page_links("products", page, info.has_more))
        }
        ResourceUri::Functionalities(page) => {
            let (items, info) = page.apply(manager.list_functionalities().await?);
            (
                to_json(items)?,
                to_json(info)?,
                page_links("functionalities", page, info.has_more),
            )
        }
        ResourceUri::Product(code) => {
            let details = manager
                .get_product_with_functionalities(&code)
                .await?
                .ok_or_else(|| AppError::not_found("Product", &code))?;
            let metadata = json!({
                "functionality_count": details.functionalities.len(),
                "incident_count": details.incidents.len(),
                "resolution_count": details.resolutions.len(),
            });
            let links = json!({
                "self": format!("product://{}", code),
                "products": "products://",
            });
            (to_json(details)?, metadata, links)
        }
        ResourceUri::Search(query) => {
            let products = manager.search_products(&query, MAX_PAGE_LIMIT).await?;
            let functionalities = manager.search_functionalities(&query, MAX_PAGE_LIMIT).await?;

            let mut hits: Vec<SearchHit> = products
                .into_iter()
                .map(|p| ("product", p.code, p.name))
                .chain(
                    functionalities
                        .into_iter()
                        .map(|f| ("functionality", f.code, f.name)),
                )
                .map(|(kind, code, name)| SearchHit {
                    score: relevance(&query, &code, &name),
                    kind,
                    code,
                    name,
                })
                .collect();
            hits.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.code.cmp(&b.code))
            });

            let metadata = json!({"query": query, "total": hits.len()});
            (to_json(hits)?, metadata, json!({"self": uri}))
        }
        ResourceUri::Schema(kind) if kind == LIVE_SCHEMA => {
            let description = manager.describe_schema().await?;
            (
                json!({"description": description}),
                json!({"type": kind, "source": "graph"}),
                json!({"self": uri, "static": "schema://ontology"}),
            )
        }
        ResourceUri::Schema(kind) => match schema_document(&kind) {
            Some(doc) => (doc, json!({"type": kind}), json!({"self": uri})),
            None => {
                let available: Vec<&str> =
                    SCHEMA_TYPES.iter().copied().chain([LIVE_SCHEMA]).collect();
                let uris: Vec<String> = available
                    .iter()
                    .map(|t| format!("schema://{}", t))
                    .collect();
                (
                    json!({
                        "error": format!("Unknown schema type '{}'", kind),
                        "available_types": available,
                    }),
                    json!({"type": kind}),
                    json!({"available": uris}),
                )
            }
        },
        ResourceUri::ServerInfo => {
            let ctx = server.context();
            let config = &ctx.config;
            let data = json!({
                "name": config.server.name,
                "version": env!("CARGO_PKG_VERSION"),
                "transport": config.server.transport.to_string(),
                "auth_enabled": ctx.auth.enabled(),
                "host": config.server.host,
                "port": config.server.port,
                "status": "running",
            });
            (data, json!({"uptime_secs": ctx.uptime_secs()}), json!({"self": uri}))
        }
    };

    Ok(ResourceEnvelope {
        uri: uri.to_string(),
        data,
        metadata,
        links,
    })
}

/// Serves `resources/read`.
pub async fn read(server: &McpServer, uri: &str) -> Result<ReadResourceResult, McpError> {
    tracing::info!(uri = %uri, "Reading resource");

    let envelope = render(server, uri).await.inspect_err(|e| {
        tracing::warn!(uri = %uri, error = %e, "Resource read failed");
    })?;
    let text = serde_json::to_string_pretty(&envelope)
        .map_err(|e| McpError::internal_error(format!("failed to render {}: {}", uri, e), None))?;

    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(text, uri)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_exact_code_caps_at_one() {
        assert_eq!(relevance("erp", "ERP", "Enterprise Resource Planning"), 1.0);
        assert_eq!(relevance("ERP", "ERP", "ERP"), 1.0);
    }

    #[test]
    fn test_relevance_partial_matches() {
        assert_eq!(relevance("REPORT", "REPORTES", "Reportes mensuales"), 1.0);
        assert_eq!(relevance("back", "BACKUP", "Respaldo"), 0.8);
        assert_eq!(relevance("respaldo", "BACKUP", "Respaldo"), 0.7);
        assert_eq!(relevance("panel", "DASHBOARD", "Panel de control"), 0.5);
        assert_eq!(relevance("zzz", "DASHBOARD", "Panel de control"), 0.0);
    }

    #[test]
    fn test_parse_paginated_uris() {
        assert_eq!(
            ResourceUri::parse("products://").unwrap(),
            ResourceUri::Products(Page::default())
        );
        assert_eq!(
            ResourceUri::parse("functionalities://10_20").unwrap(),
            ResourceUri::Functionalities(Page { limit: 10, offset: 20 })
        );
        assert!(matches!(
            ResourceUri::parse("products://0_0"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ResourceUri::parse("products://ten"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_live_schema_is_listed() {
        assert_eq!(
            ResourceUri::parse("schema://Live").unwrap(),
            ResourceUri::Schema(LIVE_SCHEMA.into())
        );
        assert!(catalog()
            .iter()
            .any(|r| r.raw.uri == "schema://live"));
    }

    #[test]
    fn test_search_query_is_percent_decoded() {
        assert_eq!(
            ResourceUri::parse("search://caf%C3%A9").unwrap(),
            ResourceUri::Search("café".into())
        );
        assert_eq!(
            ResourceUri::parse("search://gesti%C3%B3n+de+usuarios").unwrap(),
            ResourceUri::Search("gestión de usuarios".into())
        );
        assert_eq!(
            ResourceUri::parse("search://c%2B%2B").unwrap(),
            ResourceUri::Search("c++".into())
        );
    }

    #[test]
    fn test_parse_other_uris() {
        assert_eq!(
            ResourceUri::parse("product://ERP").unwrap(),
            ResourceUri::Product("ERP".into())
        );
        assert_eq!(
            ResourceUri::parse("search://gestion%20usuarios").unwrap(),
            ResourceUri::Search("gestion usuarios".into())
        );
        assert_eq!(
            ResourceUri::parse("schema://Ontology").unwrap(),
            ResourceUri::Schema("ontology".into())
        );
        assert_eq!(ResourceUri::parse("server://info").unwrap(), ResourceUri::ServerInfo);
        assert!(ResourceUri::parse("bogus://x").unwrap_err().is_not_found());
        assert!(ResourceUri::parse("product://").unwrap_err().is_not_found());
    }

    #[test]
    fn test_page_links() {
        let links = page_links("products", Page { limit: 10, offset: 10 }, true);
        assert_eq!(links["next"], "products://10_20");
        assert_eq!(links["prev"], "products://10_0");

        let first = page_links("products", Page { limit: 10, offset: 0 }, false);
        assert!(first.get("next").is_none());
        assert!(first.get("prev").is_none());
    }

    #[test]
    fn test_schema_documents() {
        for kind in SCHEMA_TYPES {
            assert!(schema_document(kind).is_some(), "{}", kind);
        }
        assert!(schema_document("incident").is_none());
    }
}

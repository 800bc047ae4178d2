//! Row and streaming types for query results.

use crate::error::AppError;
use futures::Stream;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::pin::Pin;

/// Parameters for Cypher queries, keyed by name without the `$` prefix.
pub type Params = HashMap<String, JsonValue>;

/// A stream of rows from a query result.
///
/// Rows are pulled from the driver on demand, `fetch_size` at a time.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// A single row from a query result.
///
/// Column values are held as JSON. Queries project node properties with map
/// projections (`p {.*}`), so a node column arrives as a JSON object and can
/// be deserialized straight into a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    data: HashMap<String, JsonValue>,
}

impl Row {
    /// Creates a new row from a map of column names to values.
    pub fn new(data: HashMap<String, JsonValue>) -> Self {
        Self { data }
    }

    /// Gets a column, deserializing to the requested type.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or deserialization fails.
    ///
    /// ```ignore
    /// let product: Product = row.get("p")?;
    /// let deleted: i64 = row.get("deleted")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, AppError> {
        self.data
            .get(key)
            .ok_or_else(|| AppError::Internal(format!("column not found: {}", key)))
            .and_then(|v| decode(key, v.clone()))
    }

    /// Gets a column, returning `None` if it is missing or null.
    ///
    /// Still returns an error if the value exists but fails to deserialize.
    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.data.get(key) {
            Some(v) if v.is_null() => Ok(None),
            Some(v) => decode(key, v.clone()).map(Some),
            None => Ok(None),
        }
    }

    /// Gets a `collect(...)` column as a list, dropping null entries.
    ///
    /// A missing or null column yields an empty list.
    pub fn get_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        match self.data.get(key) {
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| decode(key, v.clone()))
                .collect(),
            Some(JsonValue::Null) | None => Ok(Vec::new()),
            Some(other) => Err(AppError::Internal(format!(
                "column '{}' is not a list: {}",
                key, other
            ))),
        }
    }

    /// Returns the raw JSON value for a column, if it exists.
    pub fn get_raw(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the row and returns the underlying data map.
    pub fn into_inner(self) -> HashMap<String, JsonValue> {
        self.data
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: JsonValue) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Internal(format!("failed to deserialize '{}': {}", key, e)))
}

impl From<HashMap<String, JsonValue>> for Row {
    fn from(data: HashMap<String, JsonValue>) -> Self {
        Self::new(data)
    }
}

impl From<JsonValue> for Row {
    /// Builds a row from a JSON object; any other value yields an empty row.
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => Self::new(map.into_iter().collect()),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        code: String,
        name: String,
    }

    #[test]
    fn test_row_get_map_column() {
        let row = Row::from(json!({"p": {"code": "ERP", "name": "ERP System"}}));

        let item: Item = row.get("p").unwrap();
        assert_eq!(
            item,
            Item {
                code: "ERP".into(),
                name: "ERP System".into()
            }
        );
    }

    #[test]
    fn test_row_get_count() {
        let row = Row::from(json!({"deleted": 1}));
        let deleted: i64 = row.get("deleted").unwrap();
        assert_eq!(deleted, 1);
    }

    #[test]
    fn test_row_get_missing_key() {
        let row = Row::default();
        let result: Result<String, _> = row.get("missing");
        assert!(result.is_err());
    }

    #[test]
    fn test_row_get_opt_null_and_missing() {
        let row = Row::from(json!({"r": null}));

        let resolution: Option<Item> = row.get_opt("r").unwrap();
        assert!(resolution.is_none());
        let other: Option<Item> = row.get_opt("missing").unwrap();
        assert!(other.is_none());
    }

    #[test]
    fn test_row_get_list_skips_nulls() {
        let row = Row::from(json!({
            "functionalities": [
                {"code": "AUTH", "name": "Authentication"},
                null,
                {"code": "REPORTES", "name": "Reportes"}
            ]
        }));

        let items: Vec<Item> = row.get_list("functionalities").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].code, "REPORTES");
    }

    #[test]
    fn test_row_get_list_missing_is_empty() {
        let row = Row::default();
        let items: Vec<Item> = row.get_list("incidents").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_row_get_list_rejects_scalar() {
        let row = Row::from(json!({"incidents": 3}));
        let result: Result<Vec<Item>, _> = row.get_list("incidents");
        assert!(result.is_err());
    }

    #[test]
    fn test_row_columns() {
        let row = Row::from(json!({"a": 1, "b": 2}));

        let mut columns: Vec<_> = row.columns().collect();
        columns.sort();
        assert_eq!(columns, vec!["a", "b"]);
    }
}

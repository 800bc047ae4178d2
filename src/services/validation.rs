//! Input-shape validation shared by the ontology service and request handlers.

use serde::Serialize;

use crate::error::AppError;

pub const MAX_CODE_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 500;

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Trims `value` and checks it holds between 1 and `max` characters.
fn bounded(field: &str, value: &str, max: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters (got {})",
            field, max, len
        )));
    }
    Ok(trimmed.to_string())
}

/// A business code: 1 to 20 characters after trimming.
pub fn code(field: &str, value: &str) -> Result<String, AppError> {
    bounded(field, value, MAX_CODE_LEN)
}

pub fn name(value: &str) -> Result<String, AppError> {
    bounded("name", value, MAX_NAME_LEN)
}

pub fn description(value: &str) -> Result<String, AppError> {
    bounded("description", value, MAX_DESCRIPTION_LEN)
}

/// Free text with no upper bound, e.g. a resolution procedure.
pub fn non_empty(field: &str, value: &str) -> Result<String, AppError> {
    bounded(field, value, usize::MAX)
}

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// Pagination metadata attached to paginated responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

impl Page {
    /// Validates raw limit/offset: `1 <= limit <= 1000`, `offset >= 0`.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT as i64);
        if limit < 1 || limit > MAX_PAGE_LIMIT as i64 {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {} (got {})",
                MAX_PAGE_LIMIT, limit
            )));
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::Validation(format!(
                "offset must be non-negative (got {})",
                offset
            )));
        }
        Ok(Self {
            limit: limit as usize,
            offset: offset as usize,
        })
    }

    /// Takes the `[offset, offset + limit)` window of `items`.
    pub fn apply<T>(&self, items: Vec<T>) -> (Vec<T>, PageInfo) {
        let total = items.len();
        let page: Vec<T> = items
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .collect();
        let info = PageInfo {
            total,
            limit: self.limit,
            offset: self.offset,
            has_more: self.offset.saturating_add(self.limit) < total,
        };
        (page, info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_trimmed() {
        assert_eq!(code("code", "  ERP ").unwrap(), "ERP");
    }

    #[test]
    fn test_code_rejects_blank_and_long() {
        assert!(matches!(code("code", "   "), Err(AppError::Validation(_))));
        assert!(code("code", &"X".repeat(20)).is_ok());
        assert!(matches!(
            code("code", &"X".repeat(21)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_description_limit_counts_chars() {
        assert!(description(&"ñ".repeat(500)).is_ok());
        assert!(description(&"ñ".repeat(501)).is_err());
    }

    #[test]
    fn test_page_defaults() {
        assert_eq!(Page::new(None, None).unwrap(), Page::default());
    }

    #[test]
    fn test_page_bounds() {
        assert!(Page::new(Some(0), None).is_err());
        assert!(Page::new(Some(1001), None).is_err());
        assert!(Page::new(Some(1000), None).is_ok());
        assert!(Page::new(Some(10), Some(-1)).is_err());
    }

    #[test]
    fn test_page_length_formula() {
        let items: Vec<u32> = (0..7).collect();
        for (limit, offset) in [(3, 0), (3, 5), (10, 0), (2, 7), (2, 9)] {
            let page = Page { limit, offset };
            let (slice, info) = page.apply(items.clone());
            let expected = limit.min(7usize.saturating_sub(offset));
            assert_eq!(slice.len(), expected, "limit={} offset={}", limit, offset);
            assert_eq!(info.total, 7);
        }
    }

    #[test]
    fn test_page_has_more() {
        let items: Vec<u32> = (0..5).collect();
        let (_, first) = Page { limit: 2, offset: 0 }.apply(items.clone());
        assert!(first.has_more);
        let (last, info) = Page { limit: 2, offset: 4 }.apply(items);
        assert_eq!(last, vec![4]);
        assert!(!info.has_more);
    }
}

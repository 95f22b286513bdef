//! Parsing of the raw query-string values accepted by list endpoints.
//!
//! Values arrive as plain strings so that malformed input turns into a
//! structured 400 instead of axum's default query rejection.

use crate::core::error::{AppError, Result};
use crate::shared::constants::{
    DEFAULT_LIMIT, DEFAULT_OFFSET, MSG_BAD_PAGINATION, MSG_HAS_PHOTOS_NOT_BOOLEAN,
};

/// Offset/limit window over an ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Parse `limit`/`offset`; absent values fall back to the defaults,
    /// present ones must be non-negative integers.
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Result<Self> {
        Ok(Self {
            limit: parse_non_negative(limit, DEFAULT_LIMIT)?,
            offset: parse_non_negative(offset, DEFAULT_OFFSET)?,
        })
    }
}

fn parse_non_negative(raw: Option<&str>, default: i64) -> Result<i64> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 0 => Ok(value),
        _ => Err(AppError::Validation(MSG_BAD_PAGINATION.to_string())),
    }
}

/// Parse the `has_photos` filter: absent or empty means "no filter",
/// otherwise only `true`/`false` (any case) are accepted.
pub fn parse_photo_filter(raw: Option<&str>) -> Result<Option<bool>> {
    let raw = match raw {
        None => return Ok(None),
        Some(s) if s.is_empty() => return Ok(None),
        Some(s) => s,
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        _ => Err(AppError::Validation(MSG_HAS_PHOTOS_NOT_BOOLEAN.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let page = Pagination::from_query(None, None).unwrap();
        assert_eq!(page, Pagination { offset: 0, limit: 20 });
    }

    #[test]
    fn test_pagination_parses_values() {
        let page = Pagination::from_query(Some("10"), Some(" 2 ")).unwrap();
        assert_eq!(page, Pagination { offset: 2, limit: 10 });
    }

    #[test]
    fn test_pagination_rejects_bad_values() {
        for bad in ["-1", "fff", "", "1.5"] {
            assert!(matches!(
                Pagination::from_query(Some(bad), None),
                Err(AppError::Validation(_))
            ));
            assert!(matches!(
                Pagination::from_query(None, Some(bad)),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_photo_filter() {
        assert_eq!(parse_photo_filter(None).unwrap(), None);
        assert_eq!(parse_photo_filter(Some("")).unwrap(), None);
        assert_eq!(parse_photo_filter(Some("True")).unwrap(), Some(true));
        assert_eq!(parse_photo_filter(Some("FALSE")).unwrap(), Some(false));
    }

    #[test]
    fn test_photo_filter_rejects_other_spellings() {
        for bad in ["yes", "1", "-1", "fff", "t"] {
            assert!(matches!(
                parse_photo_filter(Some(bad)),
                Err(AppError::Validation(_))
            ));
        }
    }
}

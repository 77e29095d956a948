//! Typed query parameters
//!
//! Raw parameters arrive as optional strings (CLI flags, a future HTTP layer).
//! [`QueryFilter::parse`] validates them once against the target view, so the
//! engine never re-checks column names or date syntax.

use crate::core::views::format::{parse_date_with, STORED_DATE_FORMATS};
use crate::core::views::ViewKind;
use crate::domain::QueryError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unvalidated query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub sort_column: Option<String>,
    pub sort_order: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub filter_column: Option<String>,
    pub filter_value: Option<String>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(QueryError::InvalidSortOrder(s.to_string())),
        }
    }
}

/// Validated filter and sort settings for one view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    /// Output column and direction
    pub sort: Option<(String, SortOrder)>,

    /// Inclusive lower admission-date bound
    pub start: Option<NaiveDate>,

    /// Inclusive upper admission-date bound
    pub end: Option<NaiveDate>,

    /// Output column and the value to match in it
    pub value_filter: Option<(String, String)>,
}

impl QueryFilter {
    /// Validates `params` against the output columns of `view`
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] for an unknown sort or filter column, an
    /// unparsable date, a start date after the end date, a filter column
    /// without a value (or the reverse), or a sort order other than ASC/DESC.
    pub fn parse(params: &QueryParams, view: ViewKind) -> Result<Self, QueryError> {
        let available = view.view().output_columns();

        let sort = match non_empty(&params.sort_column) {
            Some(column) => {
                let column = known_column(column, available)?;
                let order = match non_empty(&params.sort_order) {
                    Some(order) => order.parse()?,
                    None => SortOrder::Asc,
                };
                Some((column, order))
            }
            None => {
                // A stray order is still validated
                if let Some(order) = non_empty(&params.sort_order) {
                    order.parse::<SortOrder>()?;
                }
                None
            }
        };

        let start = non_empty(&params.start_date).map(parse_bound).transpose()?;
        let end = non_empty(&params.end_date).map(parse_bound).transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(QueryError::InvalidDateRange {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }

        let value_filter = match (
            non_empty(&params.filter_column),
            non_empty(&params.filter_value),
        ) {
            (Some(column), Some(value)) => {
                Some((known_column(column, available)?, value.to_string()))
            }
            (None, None) => None,
            _ => return Err(QueryError::IncompleteFilter),
        };

        Ok(Self {
            sort,
            start,
            end,
            value_filter,
        })
    }

    /// True when either date bound is set
    pub fn has_date_range(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Whether `date` lies within the inclusive bounds
    pub fn date_in_range(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn known_column(column: &str, available: &[&str]) -> Result<String, QueryError> {
    available
        .iter()
        .find(|c| c.eq_ignore_ascii_case(column))
        .map(|c| c.to_string())
        .ok_or_else(|| QueryError::UnknownColumn {
            column: column.to_string(),
            available: available.iter().map(|c| c.to_string()).collect(),
        })
}

fn parse_bound(raw: &str) -> Result<NaiveDate, QueryError> {
    let mut formats = vec!["%Y-%m-%d"];
    formats.extend(STORED_DATE_FORMATS.iter().filter(|f| **f != "%Y-%m-%d"));
    parse_date_with(raw, &formats).ok_or_else(|| QueryError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn params() -> QueryParams {
        QueryParams::default()
    }

    #[test]
    fn test_defaults_are_empty() {
        let filter = QueryFilter::parse(&params(), ViewKind::Financial).unwrap();
        assert_eq!(filter, QueryFilter::default());
        assert!(!filter.has_date_range());
    }

    #[test]
    fn test_sort_column_is_canonicalized() {
        let p = QueryParams {
            sort_column: Some("total_tarif".into()),
            sort_order: Some("desc".into()),
            ..params()
        };
        let filter = QueryFilter::parse(&p, ViewKind::Financial).unwrap();
        assert_eq!(filter.sort, Some(("TOTAL_TARIF".to_string(), SortOrder::Desc)));
    }

    #[test]
    fn test_unknown_sort_column_lists_available() {
        let p = QueryParams {
            sort_column: Some("NOPE".into()),
            ..params()
        };
        match QueryFilter::parse(&p, ViewKind::Los).unwrap_err() {
            QueryError::UnknownColumn { column, available } => {
                assert_eq!(column, "NOPE");
                assert!(available.contains(&"CARA_PULANG".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test_case("up" ; "word")]
    #[test_case("ascending" ; "long form")]
    fn test_invalid_sort_order(order: &str) {
        let p = QueryParams {
            sort_column: Some("LOS".into()),
            sort_order: Some(order.into()),
            ..params()
        };
        assert_eq!(
            QueryFilter::parse(&p, ViewKind::Los).unwrap_err(),
            QueryError::InvalidSortOrder(order.to_string())
        );
    }

    #[test_case("2024-01-31", 2024, 1, 31 ; "iso")]
    #[test_case("31/01/2024", 2024, 1, 31 ; "day first")]
    #[test_case("20240131", 2024, 1, 31 ; "compact")]
    fn test_date_bounds(raw: &str, y: i32, m: u32, d: u32) {
        let p = QueryParams {
            start_date: Some(raw.into()),
            ..params()
        };
        let filter = QueryFilter::parse(&p, ViewKind::Financial).unwrap();
        assert_eq!(filter.start, NaiveDate::from_ymd_opt(y, m, d));
        assert!(filter.has_date_range());
    }

    #[test]
    fn test_invalid_date() {
        let p = QueryParams {
            end_date: Some("yesterday".into()),
            ..params()
        };
        assert_eq!(
            QueryFilter::parse(&p, ViewKind::Financial).unwrap_err(),
            QueryError::InvalidDate("yesterday".into())
        );
    }

    #[test]
    fn test_reversed_range() {
        let p = QueryParams {
            start_date: Some("2024-02-01".into()),
            end_date: Some("2024-01-01".into()),
            ..params()
        };
        assert!(matches!(
            QueryFilter::parse(&p, ViewKind::Financial).unwrap_err(),
            QueryError::InvalidDateRange { .. }
        ));
    }

    #[test]
    fn test_filter_pair_must_be_complete() {
        let p = QueryParams {
            filter_column: Some("SEP".into()),
            ..params()
        };
        assert_eq!(
            QueryFilter::parse(&p, ViewKind::Los).unwrap_err(),
            QueryError::IncompleteFilter
        );

        let p = QueryParams {
            filter_value: Some("x".into()),
            ..params()
        };
        assert_eq!(
            QueryFilter::parse(&p, ViewKind::Los).unwrap_err(),
            QueryError::IncompleteFilter
        );
    }

    #[test]
    fn test_filter_column_must_be_in_view() {
        let p = QueryParams {
            filter_column: Some("NAMA_PASIEN".into()),
            filter_value: Some("budi".into()),
            ..params()
        };
        assert!(QueryFilter::parse(&p, ViewKind::Financial).is_ok());
        assert!(matches!(
            QueryFilter::parse(&p, ViewKind::Inacbg).unwrap_err(),
            QueryError::UnknownColumn { .. }
        ));
    }

    #[test]
    fn test_date_in_range_is_inclusive() {
        let filter = QueryFilter {
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..QueryFilter::default()
        };
        assert!(filter.date_in_range(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(filter.date_in_range(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!filter.date_in_range(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }
}

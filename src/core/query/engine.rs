//! Query execution
//!
//! Order is fixed for every view: admission-date range on the persisted rows,
//! view derivation, value filter on the derived cells, then a stable sort.

use super::filter::{QueryFilter, SortOrder};
use crate::adapters::store::ClaimStore;
use crate::core::views::format::parse_stored_date;
use crate::core::views::{AnalyticalView, Cell, ViewKind, ViewTable};
use crate::domain::{columns, ClaimRow, Dataset, QueryError, Result};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Runs `view` over `dataset` under `filter`
///
/// # Errors
///
/// [`QueryError::NoData`] when the dataset has no rows at all, and
/// [`QueryError::MissingColumns`] when the dataset lacks any column the view
/// requires. A dataset whose rows are all filtered out yields an empty table.
pub fn execute(
    view: &dyn AnalyticalView,
    dataset: &Dataset,
    filter: &QueryFilter,
) -> std::result::Result<ViewTable, QueryError> {
    if dataset.is_empty() {
        return Err(QueryError::NoData);
    }

    let missing = dataset.missing_columns(view.required_columns());
    if !missing.is_empty() {
        return Err(QueryError::MissingColumns {
            view: view.kind().to_string(),
            columns: missing,
        });
    }

    let rows: Vec<ClaimRow> = if filter.has_date_range() {
        dataset
            .rows
            .iter()
            .filter(|row| {
                parse_stored_date(&row.text(columns::ADMISSION_DATE))
                    .is_some_and(|date| filter.date_in_range(date))
            })
            .cloned()
            .collect()
    } else {
        dataset.rows.clone()
    };

    let mut table = view.build(&rows);

    if let Some((column, value)) = &filter.value_filter {
        if let Some(index) = table.column_index(column) {
            let needle = value.trim();
            table.rows.retain(|row| cell_matches(&row[index], needle));
        }
    }

    if let Some((column, order)) = &filter.sort {
        if let Some(index) = table.column_index(column) {
            let order = *order;
            table.rows.sort_by(|a, b| compare_cells(&a[index], &b[index], order));
        }
    }

    Ok(table)
}

/// Numeric equality when both sides are numbers, otherwise a
/// case-insensitive substring match on the display text
fn cell_matches(cell: &Cell, needle: &str) -> bool {
    if let (Some(value), Ok(wanted)) = (cell.numeric, needle.parse::<f64>()) {
        return value == wanted;
    }
    cell.display.to_lowercase().contains(&needle.to_lowercase())
}

/// Sort key of one cell: kind rank first, then the value within its kind
#[derive(Debug, PartialEq)]
enum SortKey {
    Number(f64),
    Date(chrono::NaiveDate),
    Text(String),
}

impl SortKey {
    fn of(cell: &Cell) -> Self {
        match (cell.numeric, cell.date) {
            (Some(value), _) => SortKey::Number(value),
            (None, Some(date)) => SortKey::Date(date),
            (None, None) => SortKey::Text(cell.display.to_lowercase()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Date(_) => 1,
            SortKey::Text(_) => 2,
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
            (SortKey::Date(x), SortKey::Date(y)) => x.cmp(y),
            (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Total order over cells: numbers, then dates, then text
///
/// Mixed columns group by kind instead of comparing across kinds. Empty cells
/// sort last regardless of direction.
fn compare_cells(a: &Cell, b: &Cell, order: SortOrder) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ordering = SortKey::of(a).cmp(&SortKey::of(b));

    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Fetches persisted rows and runs views over them
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn ClaimStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// Runs one view against a fresh snapshot of the store
    ///
    /// # Errors
    ///
    /// Returns a store error if rows cannot be fetched, or a
    /// [`QueryError`](crate::domain::QueryError) from [`execute`].
    pub async fn run(&self, kind: ViewKind, filter: &QueryFilter) -> Result<ViewTable> {
        let started = Instant::now();
        let view = kind.view();
        let dataset = self.store.fetch_rows(&view.source_columns()).await?;
        let table = execute(view, &dataset, filter)?;

        tracing::debug!(
            view = %kind,
            source_rows = dataset.len(),
            output_rows = table.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "View executed"
        );

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryClaimStore;
    use crate::core::query::QueryParams;
    use crate::core::views::{FinancialView, LosView, PatientView};
    use crate::domain::CellValue;

    fn financial_row(sep: &str, total: f64, admitted: &str) -> ClaimRow {
        let mut row = ClaimRow::new();
        for column in FinancialView.required_columns() {
            row.set(*column, CellValue::from_raw("x"));
        }
        row.set(columns::SEP, CellValue::from_raw(sep));
        row.set(columns::NAMA_PASIEN, CellValue::from_raw(sep));
        row.set(columns::TOTAL_TARIF, CellValue::Number(total));
        row.set(columns::TARIF_RS, CellValue::Number(1_000.0));
        row.set(columns::LOS, CellValue::Number(1.0));
        row.set(columns::ADMISSION_DATE, CellValue::from_raw(admitted));
        row
    }

    fn dataset(rows: Vec<ClaimRow>) -> Dataset {
        let mut columns: Vec<String> = FinancialView
            .required_columns()
            .iter()
            .map(|c| c.to_string())
            .collect();
        columns.push(columns::SEP.to_string());
        Dataset::with_rows(columns, rows)
    }

    fn names(table: &ViewTable) -> Vec<String> {
        (0..table.len())
            .map(|i| table.cell(i, columns::NAMA_PASIEN).unwrap().display.clone())
            .collect()
    }

    fn filter(params: QueryParams) -> QueryFilter {
        QueryFilter::parse(&params, ViewKind::Financial).unwrap()
    }

    #[test]
    fn test_currency_sort_uses_raw_values() {
        // "Rp. 9.000" > "Rp. 10.000" as text; the raw values disagree
        let ds = dataset(vec![
            financial_row("a", 9_000.0, "01/01/2024"),
            financial_row("b", 10_000.0, "01/01/2024"),
            financial_row("c", 950.0, "01/01/2024"),
        ]);
        let f = filter(QueryParams {
            sort_column: Some("TOTAL_TARIF".into()),
            sort_order: Some("DESC".into()),
            ..QueryParams::default()
        });
        let table = execute(&FinancialView, &ds, &f).unwrap();
        assert_eq!(names(&table), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_date_sort_is_chronological() {
        let ds = dataset(vec![
            financial_row("a", 1.0, "02/01/2024"),
            financial_row("b", 1.0, "15/12/2023"),
            financial_row("c", 1.0, "01/02/2024"),
        ]);
        let f = filter(QueryParams {
            sort_column: Some("ADMISSION_DATE".into()),
            ..QueryParams::default()
        });
        let table = execute(&FinancialView, &ds, &f).unwrap();
        assert_eq!(names(&table), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_date_range_excludes_unparsable_only_when_active() {
        let ds = dataset(vec![
            financial_row("in", 1.0, "10/01/2024"),
            financial_row("out", 1.0, "10/03/2024"),
            financial_row("bad", 1.0, "sometime"),
        ]);

        let all = execute(&FinancialView, &ds, &QueryFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let f = filter(QueryParams {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            ..QueryParams::default()
        });
        let table = execute(&FinancialView, &ds, &f).unwrap();
        assert_eq!(names(&table), vec!["in"]);
    }

    #[test]
    fn test_value_filter_text_and_numeric() {
        let ds = dataset(vec![
            financial_row("Budi", 1_500.0, "01/01/2024"),
            financial_row("Sari", 2_500.0, "01/01/2024"),
        ]);

        let by_name = filter(QueryParams {
            filter_column: Some("NAMA_PASIEN".into()),
            filter_value: Some("BUD".into()),
            ..QueryParams::default()
        });
        assert_eq!(names(&execute(&FinancialView, &ds, &by_name).unwrap()), vec!["Budi"]);

        let by_amount = filter(QueryParams {
            filter_column: Some("TOTAL_TARIF".into()),
            filter_value: Some("2500".into()),
            ..QueryParams::default()
        });
        assert_eq!(names(&execute(&FinancialView, &ds, &by_amount).unwrap()), vec!["Sari"]);

        let by_display = filter(QueryParams {
            filter_column: Some("TOTAL_TARIF".into()),
            filter_value: Some("rp. 1.5".into()),
            ..QueryParams::default()
        });
        assert_eq!(names(&execute(&FinancialView, &ds, &by_display).unwrap()), vec!["Budi"]);
    }

    #[test]
    fn test_empty_after_filter_is_not_an_error() {
        let ds = dataset(vec![financial_row("a", 1.0, "01/01/2024")]);
        let f = filter(QueryParams {
            filter_column: Some("NAMA_PASIEN".into()),
            filter_value: Some("zzz".into()),
            ..QueryParams::default()
        });
        let table = execute(&FinancialView, &ds, &f).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), FinancialView.output_columns().len());
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let ds = Dataset::with_rows(
            vec![columns::SEP.to_string()],
            vec![ClaimRow::from_pairs([(columns::SEP, CellValue::from_raw("a"))])],
        );
        match execute(&LosView, &ds, &QueryFilter::default()).unwrap_err() {
            QueryError::MissingColumns { view, columns } => {
                assert_eq!(view, "los");
                assert!(columns.contains(&"DISCHARGE_STATUS".to_string()));
                assert!(!columns.contains(&"SEP".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_dataset_is_no_data() {
        let ds = Dataset::new(vec![]);
        assert_eq!(
            execute(&PatientView, &ds, &QueryFilter::default()).unwrap_err(),
            QueryError::NoData
        );
    }

    #[test]
    fn test_empty_cells_sort_last_both_ways() {
        let a = Cell::number(1.0);
        let b = Cell::number(2.0);
        let empty = Cell::empty();
        assert_eq!(compare_cells(&empty, &a, SortOrder::Asc), Ordering::Greater);
        assert_eq!(compare_cells(&empty, &a, SortOrder::Desc), Ordering::Greater);
        assert_eq!(compare_cells(&a, &b, SortOrder::Desc), Ordering::Greater);
    }

    #[test]
    fn test_mixed_date_column_sorts_consistently() {
        let mut rows = Vec::new();
        for i in 0..60u32 {
            let admitted = if i % 3 == 0 {
                format!("{:02}/xx/2024", i % 28 + 1)
            } else {
                format!("{:02}/{:02}/2024", (i * 7) % 28 + 1, i % 12 + 1)
            };
            rows.push(financial_row(&format!("r{i}"), 1.0, &admitted));
        }
        let f = filter(QueryParams {
            sort_column: Some("ADMISSION_DATE".into()),
            ..QueryParams::default()
        });
        let table = execute(&FinancialView, &dataset(rows), &f).unwrap();

        let cells: Vec<&Cell> = (0..table.len())
            .map(|i| table.cell(i, columns::ADMISSION_DATE).unwrap())
            .collect();
        let dates: Vec<_> = cells.iter().filter_map(|c| c.date).collect();
        assert_eq!(dates.len(), 40);
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));

        // Every parsable date precedes every unparsable one
        let first_text = cells.iter().position(|c| c.date.is_none()).unwrap();
        assert_eq!(first_text, 40);
        let texts: Vec<String> = cells[first_text..]
            .iter()
            .map(|c| c.display.to_lowercase())
            .collect();
        assert!(texts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_mixed_number_and_text_cells() {
        let cells = [
            Cell::text("M-10"),
            Cell::number(200.0),
            Cell::text("a1"),
            Cell::number(3.0),
            Cell::date("05/01/2024"),
        ];
        let mut sorted = cells.to_vec();
        sorted.sort_by(|a, b| compare_cells(a, b, SortOrder::Asc));
        let shown: Vec<&str> = sorted.iter().map(|c| c.display.as_str()).collect();
        assert_eq!(shown, vec!["3", "200", "05/01/2024", "a1", "M-10"]);

        sorted.sort_by(|a, b| compare_cells(a, b, SortOrder::Desc));
        let shown: Vec<&str> = sorted.iter().map(|c| c.display.as_str()).collect();
        assert_eq!(shown, vec!["M-10", "a1", "05/01/2024", "200", "3"]);
    }

    #[tokio::test]
    async fn test_engine_runs_against_store() {
        let store = Arc::new(MemoryClaimStore::new());
        store
            .insert_batch(vec![
                financial_row("S1", 5.0, "01/01/2024"),
                financial_row("S2", 7.0, "01/01/2024"),
            ])
            .await
            .unwrap();

        let engine = QueryEngine::new(store);
        let table = engine
            .run(ViewKind::Financial, &QueryFilter::default())
            .await
            .unwrap();
        assert_eq!(table.len(), 2);

        let err = engine
            .run(ViewKind::Ventilator, &QueryFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::domain::ClaimReconError::Query(QueryError::MissingColumns { .. })
        ));
    }
}

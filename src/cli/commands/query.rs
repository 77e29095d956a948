//! Query command implementation
//!
//! Runs one analytical view with optional sort, admission-date range and
//! value filter, and prints it as an aligned table, JSON or CSV.

use super::{connect_or_exit, load_or_exit, EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use crate::core::query::{QueryEngine, QueryFilter, QueryParams};
use crate::core::views::{ViewKind, ViewTable};
use crate::domain::ClaimReconError;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::io::Write;

/// How query results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Arguments for the query command
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// View to run (financial, patient, los, inacbg, selisih-tarif, ventilator)
    pub view: String,

    /// Output column to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort order (ASC or DESC)
    #[arg(long)]
    pub order: Option<String>,

    /// Inclusive lower admission-date bound (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Inclusive upper admission-date bound (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Output column to filter on
    #[arg(long)]
    pub filter_column: Option<String>,

    /// Value to match in the filter column
    #[arg(long)]
    pub filter_value: Option<String>,

    /// Maximum rows to print (0 for all; defaults to query.default_limit)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl QueryArgs {
    fn params(&self) -> QueryParams {
        QueryParams {
            sort_column: self.sort.clone(),
            sort_order: self.order.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            filter_column: self.filter_column.clone(),
            filter_value: self.filter_value.clone(),
        }
    }

    /// Execute the query command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let kind: ViewKind = match self.view.parse() {
            Ok(k) => k,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // Parameters are checked before any store access
        let filter = match QueryFilter::parse(&self.params(), kind) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(view = %kind, error = %e, "Invalid query parameters");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let config = match load_or_exit(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = match connect_or_exit(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        tracing::info!(view = %kind, backend = store.backend_name(), "Running view");
        let mut table = match QueryEngine::new(store).run(kind, &filter).await {
            Ok(t) => t,
            Err(ClaimReconError::Query(e)) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_FATAL);
            }
            Err(e) => {
                tracing::error!(view = %kind, error = %e, "Query failed");
                eprintln!("Query failed: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let total = table.len();
        table.truncate(self.limit.unwrap_or(config.query.default_limit));

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match self.format {
            OutputFormat::Table => {
                write_table(&mut out, &table)?;
                writeln!(out)?;
                writeln!(out, "{} of {} row(s)", table.len(), total)?;
            }
            OutputFormat::Json => write_json(&mut out, kind, &table)?,
            OutputFormat::Csv => write_csv(&mut out, &table)?,
        }

        Ok(EXIT_SUCCESS)
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    view: &'static str,
    columns: &'a [String],
    rows: Vec<Vec<String>>,
}

/// Writes `{"view", "columns", "rows"}` with display strings
pub fn write_json(out: &mut impl Write, kind: ViewKind, table: &ViewTable) -> anyhow::Result<()> {
    let payload = JsonOutput {
        view: kind.as_str(),
        columns: &table.columns,
        rows: table.display_rows(),
    };
    serde_json::to_writer_pretty(&mut *out, &payload)?;
    writeln!(out)?;
    Ok(())
}

/// Writes a header row plus display strings
pub fn write_csv(out: &mut impl Write, table: &ViewTable) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&table.columns)?;
    for row in table.display_rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes columns padded to their widest cell
pub fn write_table(out: &mut impl Write, table: &ViewTable) -> anyhow::Result<()> {
    let rows = table.display_rows();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(&table.columns))?;
    writeln!(out, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)))?;
    for row in &rows {
        writeln!(out, "{}", line(row))?;
    }
    Ok(())
}

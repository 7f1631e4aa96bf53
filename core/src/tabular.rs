//! Semicolon-delimited tabular export.
//!
//! The whole document is built in memory; on any failure the caller gets
//! an error and no bytes at all.

use crate::{
    aggregation::{MonthBucket, MonthlyValue},
    error::{ReportError, ReportResult},
    model::Cooperative,
};
use csv::{QuoteStyle, Terminator, WriterBuilder};

pub const SEPARATOR: u8 = b';';

/// A report row with a fixed set of columns.
pub trait TabularRow {
    /// Literal header row.
    fn header() -> &'static [&'static str];

    /// Column values in header order.
    fn fields(&self) -> Vec<String>;
}

/// Header first, then one line per row. An empty slice still yields the header.
pub fn encode<R: TabularRow>(rows: &[R]) -> ReportResult<Vec<u8>> {
    let mut wtr = WriterBuilder::new()
        .delimiter(SEPARATOR)
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    wtr.write_record(R::header())?;
    for row in rows {
        wtr.write_record(row.fields())?;
    }
    wtr.into_inner()
        .map_err(|e| ReportError::ExportFailure(e.error().to_string()))
}

/// Decimal text as legacy consumers expect it: always at least one
/// fractional digit (`3.0`, `12.5`).
pub fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}

impl TabularRow for Cooperative {
    fn header() -> &'static [&'static str] {
        &["Id", "Nome", "Email", "CNPJ"]
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.tax_id.clone(),
        ]
    }
}

impl TabularRow for MonthBucket {
    fn header() -> &'static [&'static str] {
        &["Mês", "Valores"]
    }

    /// Materials flatten to `name:kg,` per entry; the trailing comma stays.
    fn fields(&self) -> Vec<String> {
        let materials: String = self
            .materials
            .iter()
            .map(|m| format!("{}:{},", m.material, format_decimal(m.quantity_kg)))
            .collect();
        vec![self.label.clone(), materials]
    }
}

impl TabularRow for MonthlyValue {
    fn header() -> &'static [&'static str] {
        &["Mês", "Valor"]
    }

    fn fields(&self) -> Vec<String> {
        vec![self.month.clone(), format_decimal(self.value)]
    }
}

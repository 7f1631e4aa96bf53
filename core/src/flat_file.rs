//! Fixed-width flat-file export of a cooperative profile and price list.
//!
//! Layout, one record per line:
//!   00  header   "COOPERATIVA" + dd-MM-yyyy HH:mm:ss
//!   02  profile  name(25) tax id(16) email(30), left-justified
//!   03  price    "Material-<name>"(17) + price with 2 decimals
//!   01  trailer  record count right-justified in 10, no newline after it
//!
//! Legacy consumers parse by offset, so widths and padding are exact.

use crate::{
    error::ReportResult,
    model::{Cooperative, PriceCatalogEntry},
};
use chrono::NaiveDateTime;
use std::io::Write;

const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub enum FlatRecord {
    Header { generated_at: NaiveDateTime },
    Profile { name: String, tax_id: String, email: String },
    Price { material: String, unit_price: f64 },
    Trailer { record_count: usize },
}

impl FlatRecord {
    pub fn type_code(&self) -> &'static str {
        match self {
            FlatRecord::Header { .. }  => "00",
            FlatRecord::Trailer { .. } => "01",
            FlatRecord::Profile { .. } => "02",
            FlatRecord::Price { .. }   => "03",
        }
    }

    /// The record's line, without terminator.
    pub fn encode(&self) -> String {
        let body = match self {
            FlatRecord::Header { generated_at } => {
                format!("COOPERATIVA{}", generated_at.format(TIMESTAMP_FORMAT))
            }
            FlatRecord::Profile { name, tax_id, email } => {
                format!("{name:<25.25}{tax_id:<16.16}{email:<30.30}")
            }
            FlatRecord::Price { material, unit_price } => {
                let label = format!("Material-{material}");
                format!("{label:<17.17}{unit_price:>3.2}")
            }
            FlatRecord::Trailer { record_count } => format!("{record_count:>10}"),
        };
        format!("{}{body}", self.type_code())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlatRecord::Trailer { .. })
    }
}

/// Build the record sequence for one cooperative.
///
/// One price line per canonical material, in canonical order; a material
/// missing from the catalog is priced at zero. The trailer counts the
/// price lines plus the profile line.
pub fn records_for(
    cooperative: &Cooperative,
    catalog: &[PriceCatalogEntry],
    canonical_materials: &[String],
    generated_at: NaiveDateTime,
) -> Vec<FlatRecord> {
    let mut records = vec![
        FlatRecord::Header { generated_at },
        FlatRecord::Profile {
            name:   cooperative.name.clone(),
            tax_id: cooperative.tax_id.clone(),
            email:  cooperative.email.clone(),
        },
    ];

    for material in canonical_materials {
        // Last matching entry wins if the catalog repeats a material.
        let unit_price = catalog
            .iter()
            .rev()
            .find(|e| &e.material == material)
            .map(|e| e.unit_price)
            .unwrap_or(0.0);
        records.push(FlatRecord::Price { material: material.clone(), unit_price });
    }

    records.push(FlatRecord::Trailer { record_count: canonical_materials.len() + 1 });
    records
}

/// Write every record, newline-terminated except the trailer.
pub fn encode(records: &[FlatRecord]) -> ReportResult<Vec<u8>> {
    let mut out = Vec::new();
    for record in records {
        out.write_all(record.encode().as_bytes())?;
        if !record.is_terminal() {
            out.write_all(b"\n")?;
        }
    }
    Ok(out)
}

use super::SqliteStore;
use crate::{
    error::{ReportError, ReportResult},
    model::{Cooperative, PriceCatalogEntry},
    types::{CooperativeId, PriceEntryId},
};
use rusqlite::{params, OptionalExtension};

fn cooperative_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Cooperative> {
    Ok(Cooperative {
        id:     row.get(0)?,
        name:   row.get(1)?,
        tax_id: row.get(2)?,
        email:  row.get(3)?,
    })
}

fn price_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<PriceCatalogEntry> {
    Ok(PriceCatalogEntry {
        id:             row.get(0)?,
        cooperative_id: row.get(1)?,
        material:       row.get(2)?,
        unit_price:     row.get(3)?,
    })
}

impl SqliteStore {
    // ── Cooperative ────────────────────────────────────────────

    pub fn insert_cooperative(&self, c: &Cooperative) -> ReportResult<()> {
        self.conn.execute(
            "INSERT INTO cooperative (id, name, tax_id, email) VALUES (?1, ?2, ?3, ?4)",
            params![c.id, &c.name, &c.tax_id, &c.email],
        )?;
        Ok(())
    }

    pub fn get_cooperative(&self, id: CooperativeId) -> ReportResult<Cooperative> {
        self.conn
            .query_row(
                "SELECT id, name, tax_id, email FROM cooperative WHERE id = ?1",
                params![id],
                cooperative_row_mapper,
            )
            .optional()?
            .ok_or(ReportError::NotFound { entity: "cooperative", id })
    }

    pub fn all_cooperatives(&self) -> ReportResult<Vec<Cooperative>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, tax_id, email FROM cooperative ORDER BY id ASC")?;
        let rows = stmt.query_map([], cooperative_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Price catalog ──────────────────────────────────────────

    pub fn insert_price_entry(&self, e: &PriceCatalogEntry) -> ReportResult<()> {
        self.conn.execute(
            "INSERT INTO price_entry (id, cooperative_id, material, unit_price)
             VALUES (?1, ?2, ?3, ?4)",
            params![e.id, e.cooperative_id, &e.material, e.unit_price],
        )?;
        Ok(())
    }

    pub fn get_price_entry(&self, id: PriceEntryId) -> ReportResult<PriceCatalogEntry> {
        self.conn
            .query_row(
                "SELECT id, cooperative_id, material, unit_price
                 FROM price_entry WHERE id = ?1",
                params![id],
                price_row_mapper,
            )
            .optional()?
            .ok_or(ReportError::NotFound { entity: "price entry", id })
    }

    /// Catalog for one cooperative, cheapest first.
    pub fn price_entries_for_cooperative(
        &self,
        cooperative_id: CooperativeId,
    ) -> ReportResult<Vec<PriceCatalogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, cooperative_id, material, unit_price
             FROM price_entry WHERE cooperative_id = ?1
             ORDER BY unit_price ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![cooperative_id], price_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

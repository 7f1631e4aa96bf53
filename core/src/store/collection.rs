use super::SqliteStore;
use crate::{
    error::{ReportError, ReportResult},
    model::{CollectionRecord, NewCollection, PickupEvent, PickupStatus, PriceCatalogEntry},
    types::{DateAxis, PickupEventId, Subject},
    window::TimeWindow,
};
use rusqlite::{params, OptionalExtension};

const PICKUP_COLUMNS: &str =
    "id, cooperative_id, condominium_id, scheduled_at, retrieved_at, bag_count, status";

const RECORD_SELECT: &str = "SELECT cr.id, cr.quantity_kg, cr.total_value,
        pe.id, pe.cooperative_id, pe.material, pe.unit_price,
        pk.id, pk.cooperative_id, pk.condominium_id, pk.scheduled_at, pk.retrieved_at,
        pk.bag_count, pk.status
     FROM collection_record cr
     JOIN price_entry pe  ON pe.id = cr.price_entry_id
     JOIN pickup_event pk ON pk.id = cr.pickup_event_id";

fn parse_status(idx: usize, raw: String) -> rusqlite::Result<PickupStatus> {
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

// Helper for pickup rows starting at column `base`.
fn pickup_from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<PickupEvent> {
    Ok(PickupEvent {
        id:             row.get(base)?,
        cooperative_id: row.get(base + 1)?,
        condominium_id: row.get(base + 2)?,
        scheduled_at:   row.get(base + 3)?,
        retrieved_at:   row.get(base + 4)?,
        bag_count:      row.get(base + 5)?,
        status:         parse_status(base + 6, row.get(base + 6)?)?,
    })
}

fn record_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<CollectionRecord> {
    Ok(CollectionRecord {
        id:          row.get(0)?,
        quantity_kg: row.get(1)?,
        value:       row.get(2)?,
        material: PriceCatalogEntry {
            id:             row.get(3)?,
            cooperative_id: row.get(4)?,
            material:       row.get(5)?,
            unit_price:     row.get(6)?,
        },
        pickup: pickup_from_row(row, 7)?,
    })
}

fn subject_column(subject: Subject) -> &'static str {
    match subject {
        Subject::Cooperative(_) => "pk.cooperative_id",
        Subject::Condominium(_) => "pk.condominium_id",
    }
}

fn axis_column(axis: DateAxis) -> &'static str {
    match axis {
        DateAxis::Scheduled => "pk.scheduled_at",
        DateAxis::Retrieval => "pk.retrieved_at",
    }
}

impl SqliteStore {
    // ── Pickup event ───────────────────────────────────────────

    pub fn insert_pickup_event(&self, p: &PickupEvent) -> ReportResult<()> {
        self.conn.execute(
            &format!("INSERT INTO pickup_event ({PICKUP_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                p.id,
                p.cooperative_id,
                p.condominium_id,
                p.scheduled_at,
                p.retrieved_at,
                p.bag_count,
                p.status.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn get_pickup_event(&self, id: PickupEventId) -> ReportResult<PickupEvent> {
        self.conn
            .query_row(
                &format!("SELECT {PICKUP_COLUMNS} FROM pickup_event WHERE id = ?1"),
                params![id],
                |row| pickup_from_row(row, 0),
            )
            .optional()?
            .ok_or(ReportError::NotFound { entity: "pickup event", id })
    }

    // ── Collection record ──────────────────────────────────────

    /// Persist a fully-formed record. Most callers want register_collection().
    pub fn insert_collection(&self, r: &CollectionRecord) -> ReportResult<()> {
        self.conn.execute(
            "INSERT INTO collection_record (id, price_entry_id, pickup_event_id, quantity_kg, total_value)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![r.id, r.material.id, r.pickup.id, r.quantity_kg, r.value],
        )?;
        Ok(())
    }

    /// Registration workflow: resolve the price entry and pickup, price the
    /// quantity at the current unit price, and store the line item.
    pub fn register_collection(&self, new: &NewCollection) -> ReportResult<CollectionRecord> {
        let material = self.get_price_entry(new.price_entry_id)?;
        let pickup = self.get_pickup_event(new.pickup_event_id)?;
        let value = new.quantity_kg * material.unit_price;

        self.conn.execute(
            "INSERT INTO collection_record (price_entry_id, pickup_event_id, quantity_kg, total_value)
             VALUES (?1, ?2, ?3, ?4)",
            params![material.id, pickup.id, new.quantity_kg, value],
        )?;
        let id = self.conn.last_insert_rowid();
        log::debug!(
            "Registered collection {id}: {} kg of {} on pickup {}",
            new.quantity_kg, material.material, pickup.id
        );

        Ok(CollectionRecord {
            id,
            quantity_kg: new.quantity_kg,
            value,
            material,
            pickup,
        })
    }

    pub fn collections_in_window(
        &self,
        subject: Subject,
        axis: DateAxis,
        window: &TimeWindow,
    ) -> ReportResult<Vec<CollectionRecord>> {
        let axis_col = axis_column(axis);
        let sql = format!(
            "{RECORD_SELECT}
             WHERE {} = ?1 AND {axis_col} >= ?2 AND {axis_col} <= ?3
             ORDER BY {axis_col} ASC, cr.id ASC",
            subject_column(subject),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![subject.id(), window.start, window.end],
            record_row_mapper,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn collections_for_subject(&self, subject: Subject) -> ReportResult<Vec<CollectionRecord>> {
        let sql = format!(
            "{RECORD_SELECT}
             WHERE {} = ?1
             ORDER BY pk.retrieved_at ASC, cr.id ASC",
            subject_column(subject),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![subject.id()], record_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Number of collection rows stored (for tests and summaries).
    pub fn collection_count(&self) -> ReportResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM collection_record",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

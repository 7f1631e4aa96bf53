//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! The reporting engine reads through CollectionSource and never executes SQL.

mod collection;
mod cooperative;

use crate::{
    error::ReportResult,
    model::{CollectionRecord, Cooperative, PickupEvent, PriceCatalogEntry},
    source::CollectionSource,
    types::{CooperativeId, DateAxis, PickupEventId, PriceEntryId, Subject},
    window::TimeWindow,
};
use rusqlite::Connection;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file. URI filenames are accepted.
    pub fn open(path: &str) -> ReportResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // In-memory databases answer "memory" and stay that way.
        match conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        }) {
            Ok(mode) => log::debug!("Opened {path} with journal_mode={mode}"),
            Err(e) => log::warn!("Could not enable WAL on {path}: {e}"),
        }
        Self::with_connection(conn)
    }

    /// Private in-memory database for tests.
    pub fn in_memory() -> ReportResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> ReportResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ReportResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }
}

impl CollectionSource for SqliteStore {
    fn records_in_window(
        &self,
        subject: Subject,
        axis: DateAxis,
        window: &TimeWindow,
    ) -> ReportResult<Vec<CollectionRecord>> {
        self.collections_in_window(subject, axis, window)
    }

    fn records_for_subject(&self, subject: Subject) -> ReportResult<Vec<CollectionRecord>> {
        self.collections_for_subject(subject)
    }

    fn price_catalog(&self, cooperative_id: CooperativeId) -> ReportResult<Vec<PriceCatalogEntry>> {
        self.price_entries_for_cooperative(cooperative_id)
    }

    fn price_entry(&self, id: PriceEntryId) -> ReportResult<PriceCatalogEntry> {
        self.get_price_entry(id)
    }

    fn pickup_event(&self, id: PickupEventId) -> ReportResult<PickupEvent> {
        self.get_pickup_event(id)
    }

    fn cooperative(&self, id: CooperativeId) -> ReportResult<Cooperative> {
        self.get_cooperative(id)
    }

    fn cooperatives(&self) -> ReportResult<Vec<Cooperative>> {
        self.all_cooperatives()
    }
}

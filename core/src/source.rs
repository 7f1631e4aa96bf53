//! Read-only data-access contract the reporting engine depends on.
//!
//! RULE: the engine never reaches into storage directly. Everything it
//! reads comes through a CollectionSource handed to it at construction.

use crate::{
    error::{ReportError, ReportResult},
    model::{CollectionRecord, Cooperative, PickupEvent, PriceCatalogEntry},
    types::{CooperativeId, DateAxis, PickupEventId, PriceEntryId, Subject},
    window::TimeWindow,
};

pub trait CollectionSource {
    /// Records for `subject` whose `axis` timestamp falls inside `window`
    /// (inclusive both ends), ordered by that timestamp then record id.
    fn records_in_window(
        &self,
        subject: Subject,
        axis: DateAxis,
        window: &TimeWindow,
    ) -> ReportResult<Vec<CollectionRecord>>;

    /// Every record for `subject`, oldest retrieval first.
    fn records_for_subject(&self, subject: Subject) -> ReportResult<Vec<CollectionRecord>>;

    fn price_catalog(&self, cooperative_id: CooperativeId) -> ReportResult<Vec<PriceCatalogEntry>>;

    fn price_entry(&self, id: PriceEntryId) -> ReportResult<PriceCatalogEntry>;

    fn pickup_event(&self, id: PickupEventId) -> ReportResult<PickupEvent>;

    fn cooperative(&self, id: CooperativeId) -> ReportResult<Cooperative>;

    fn cooperatives(&self) -> ReportResult<Vec<Cooperative>>;
}

impl<T: CollectionSource + ?Sized> CollectionSource for &T {
    fn records_in_window(
        &self,
        subject: Subject,
        axis: DateAxis,
        window: &TimeWindow,
    ) -> ReportResult<Vec<CollectionRecord>> {
        (**self).records_in_window(subject, axis, window)
    }

    fn records_for_subject(&self, subject: Subject) -> ReportResult<Vec<CollectionRecord>> {
        (**self).records_for_subject(subject)
    }

    fn price_catalog(&self, cooperative_id: CooperativeId) -> ReportResult<Vec<PriceCatalogEntry>> {
        (**self).price_catalog(cooperative_id)
    }

    fn price_entry(&self, id: PriceEntryId) -> ReportResult<PriceCatalogEntry> {
        (**self).price_entry(id)
    }

    fn pickup_event(&self, id: PickupEventId) -> ReportResult<PickupEvent> {
        (**self).pickup_event(id)
    }

    fn cooperative(&self, id: CooperativeId) -> ReportResult<Cooperative> {
        (**self).cooperative(id)
    }

    fn cooperatives(&self) -> ReportResult<Vec<Cooperative>> {
        (**self).cooperatives()
    }
}

pub(crate) fn axis_instant(record: &CollectionRecord, axis: DateAxis) -> chrono::NaiveDateTime {
    match axis {
        DateAxis::Scheduled => record.pickup.scheduled_at,
        DateAxis::Retrieval => record.pickup.retrieved_at,
    }
}

pub(crate) fn belongs_to(record: &CollectionRecord, subject: Subject) -> bool {
    match subject {
        Subject::Cooperative(id) => record.pickup.cooperative_id == id,
        Subject::Condominium(id) => record.pickup.condominium_id == id,
    }
}

/// Vector-backed source with the same filtering rules as the SQLite store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub cooperatives: Vec<Cooperative>,
    pub catalog:      Vec<PriceCatalogEntry>,
    pub pickups:      Vec<PickupEvent>,
    pub records:      Vec<CollectionRecord>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cooperative(mut self, cooperative: Cooperative) -> Self {
        self.cooperatives.push(cooperative);
        self
    }

    pub fn with_price(mut self, entry: PriceCatalogEntry) -> Self {
        self.catalog.push(entry);
        self
    }

    pub fn with_pickup(mut self, pickup: PickupEvent) -> Self {
        self.pickups.push(pickup);
        self
    }

    pub fn with_record(mut self, record: CollectionRecord) -> Self {
        self.records.push(record);
        self
    }

    fn sorted_by(&self, axis: DateAxis, mut records: Vec<CollectionRecord>) -> Vec<CollectionRecord> {
        records.sort_by(|a, b| {
            axis_instant(a, axis)
                .cmp(&axis_instant(b, axis))
                .then(a.id.cmp(&b.id))
        });
        records
    }
}

impl CollectionSource for InMemorySource {
    fn records_in_window(
        &self,
        subject: Subject,
        axis: DateAxis,
        window: &TimeWindow,
    ) -> ReportResult<Vec<CollectionRecord>> {
        let matching = self
            .records
            .iter()
            .filter(|r| belongs_to(r, subject) && window.contains(axis_instant(r, axis)))
            .cloned()
            .collect();
        Ok(self.sorted_by(axis, matching))
    }

    fn records_for_subject(&self, subject: Subject) -> ReportResult<Vec<CollectionRecord>> {
        let matching = self
            .records
            .iter()
            .filter(|r| belongs_to(r, subject))
            .cloned()
            .collect();
        Ok(self.sorted_by(DateAxis::Retrieval, matching))
    }

    fn price_catalog(&self, cooperative_id: CooperativeId) -> ReportResult<Vec<PriceCatalogEntry>> {
        let mut entries: Vec<PriceCatalogEntry> = self
            .catalog
            .iter()
            .filter(|e| e.cooperative_id == cooperative_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.unit_price.total_cmp(&b.unit_price));
        Ok(entries)
    }

    fn price_entry(&self, id: PriceEntryId) -> ReportResult<PriceCatalogEntry> {
        self.catalog
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(ReportError::NotFound { entity: "price entry", id })
    }

    fn pickup_event(&self, id: PickupEventId) -> ReportResult<PickupEvent> {
        self.pickups
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ReportError::NotFound { entity: "pickup event", id })
    }

    fn cooperative(&self, id: CooperativeId) -> ReportResult<Cooperative> {
        self.cooperatives
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(ReportError::NotFound { entity: "cooperative", id })
    }

    fn cooperatives(&self) -> ReportResult<Vec<Cooperative>> {
        let mut all = self.cooperatives.clone();
        all.sort_by_key(|c| c.id);
        Ok(all)
    }
}

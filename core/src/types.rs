//! Shared primitive types used across the reporting engine.

use serde::{Deserialize, Serialize};

pub type CooperativeId = i64;
pub type CondominiumId = i64;
pub type PickupEventId = i64;
pub type PriceEntryId = i64;
pub type RecordId = i64;

/// Whose collections a report is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    Cooperative(CooperativeId),
    Condominium(CondominiumId),
}

impl Subject {
    pub fn id(&self) -> i64 {
        match self {
            Subject::Cooperative(id) | Subject::Condominium(id) => *id,
        }
    }
}

/// Which pickup timestamp a window filter applies to.
/// Weekly curves bucket by schedule, monthly and daily reports by retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateAxis {
    Scheduled,
    Retrieval,
}

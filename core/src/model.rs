//! Read-only records the engine consumes.
//!
//! RULE: aggregation keys (weekday, month, material name) are derived
//! from these records at report time. They are never stored.

use crate::types::{CondominiumId, CooperativeId, PickupEventId, PriceEntryId, RecordId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cooperative {
    pub id:     CooperativeId,
    pub name:   String,
    pub tax_id: String,
    pub email:  String,
}

/// A material and its current unit price (currency per kg) for one cooperative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalogEntry {
    pub id:             PriceEntryId,
    pub cooperative_id: CooperativeId,
    pub material:       String,
    pub unit_price:     f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl PickupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupStatus::Scheduled  => "scheduled",
            PickupStatus::InProgress => "in_progress",
            PickupStatus::Completed  => "completed",
            PickupStatus::Cancelled  => "cancelled",
        }
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickupStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled"   => Ok(PickupStatus::Scheduled),
            "in_progress" => Ok(PickupStatus::InProgress),
            "completed"   => Ok(PickupStatus::Completed),
            "cancelled"   => Ok(PickupStatus::Cancelled),
            other         => Err(format!("unknown pickup status '{other}'")),
        }
    }
}

/// A scheduled or completed pickup at a condominium.
///
/// `scheduled_at` and `retrieved_at` are distinct instants: the weekly
/// curve reads the former, month and year buckets read the latter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupEvent {
    pub id:             PickupEventId,
    pub cooperative_id: CooperativeId,
    pub condominium_id: CondominiumId,
    pub scheduled_at:   NaiveDateTime,
    pub retrieved_at:   NaiveDateTime,
    pub bag_count:      i64,
    pub status:         PickupStatus,
}

/// One material line item collected during a pickup. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub id:          RecordId,
    pub quantity_kg: f64,
    /// quantity × unit price at the time of collection.
    pub value:       f64,
    pub material:    PriceCatalogEntry,
    pub pickup:      PickupEvent,
}

impl CollectionRecord {
    pub fn material_name(&self) -> &str {
        &self.material.material
    }
}

/// Input to the registration workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCollection {
    pub price_entry_id:  PriceEntryId,
    pub pickup_event_id: PickupEventId,
    pub quantity_kg:     f64,
}

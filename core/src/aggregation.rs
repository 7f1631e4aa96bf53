//! Aggregation engine — reduces collection records into report figures.
//!
//! Every function here is pure: callers fetch the records for the right
//! window and axis, and get plain values back. A bucket with no records
//! resolves to zero, never to absence.

use crate::{config::MonthOrder, model::CollectionRecord, window};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

const MONTH_NAMES: [&str; 12] = [
    "JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE",
    "JULY", "AUGUST", "SEPTEMBER", "OCTOBER", "NOVEMBER", "DECEMBER",
];

// ── Result types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotal {
    pub label:    String,
    pub total_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTotal {
    pub material:    String,
    pub quantity_kg: f64,
}

impl MaterialTotal {
    /// Returned when there is nothing to rank.
    pub fn none() -> Self {
        Self { material: String::new(), quantity_kg: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialShare {
    pub material: String,
    /// Whole percent of the month's total kg, rounded half-up.
    pub percent:  u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialMonthTotal {
    pub material:    String,
    pub quantity_kg: f64,
    pub value:       f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// `MONTH/YEAR`, e.g. `MARCH/2024`.
    pub label:     String,
    pub year:      i32,
    pub month:     u32,
    pub materials: Vec<MaterialMonthTotal>,
}

impl MonthBucket {
    pub fn total_kg(&self) -> f64 {
        self.materials.iter().map(|m| m.quantity_kg).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.materials.iter().map(|m| m.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyValue {
    pub month: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthOverMonth {
    pub current:        i64,
    pub previous:       i64,
    pub percent_change: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopMaterials {
    pub current_month:  String,
    pub previous_month: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date:     NaiveDate,
    pub total_kg: f64,
}

// ── Totals ───────────────────────────────────────────────────────────────────

pub fn total_kg(records: &[CollectionRecord]) -> f64 {
    records.iter().map(|r| r.quantity_kg).sum()
}

pub fn total_value(records: &[CollectionRecord]) -> f64 {
    records.iter().map(|r| r.value).sum()
}

fn kg_by_material(records: &[CollectionRecord]) -> BTreeMap<&str, f64> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for r in records {
        *sums.entry(r.material_name()).or_insert(0.0) += r.quantity_kg;
    }
    sums
}

// ── Weekly curve ─────────────────────────────────────────────────────────────

/// Sum kg per weekday of the pickup's scheduled time, Monday first.
/// Always returns one entry per label, zero-filled.
pub fn weekly_curve(records: &[CollectionRecord], labels: &[String]) -> Vec<DayTotal> {
    let mut sums = [0.0_f64; 7];
    for r in records {
        let day = r.pickup.scheduled_at.weekday().num_days_from_monday() as usize;
        sums[day] += r.quantity_kg;
    }
    labels
        .iter()
        .zip(sums)
        .map(|(label, total_kg)| DayTotal { label: label.clone(), total_kg })
        .collect()
}

// ── Rankings ─────────────────────────────────────────────────────────────────

/// Material with the largest kg total. Equal totals go to the name that
/// sorts first, so the answer never depends on record order.
pub fn most_recycled(records: &[CollectionRecord]) -> MaterialTotal {
    let mut best: Option<(&str, f64)> = None;
    for (material, kg) in kg_by_material(records) {
        match best {
            Some((_, top)) if kg <= top => {}
            _ => best = Some((material, kg)),
        }
    }
    best.map(|(material, quantity_kg)| MaterialTotal {
        material: material.to_string(),
        quantity_kg,
    })
    .unwrap_or_else(MaterialTotal::none)
}

/// Name of the most collected material, or `fallback` for an empty month.
pub fn top_material_label(records: &[CollectionRecord], fallback: &str) -> String {
    let top = most_recycled(records);
    if top.material.is_empty() {
        fallback.to_string()
    } else {
        top.material
    }
}

// ── Material mix ─────────────────────────────────────────────────────────────

/// Percent of total kg per material, ordered by material name.
/// An empty or zero-weight month yields an empty breakdown.
pub fn percentage_per_material(records: &[CollectionRecord]) -> Vec<MaterialShare> {
    let total = total_kg(records);
    if total <= 0.0 {
        return Vec::new();
    }
    kg_by_material(records)
        .into_iter()
        .map(|(material, kg)| MaterialShare {
            material: material.to_string(),
            percent:  round_half_up(kg * 100.0 / total) as u32,
        })
        .collect()
}

fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

// ── Monthly buckets ──────────────────────────────────────────────────────────

pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("UNKNOWN");
    format!("{name}/{year}")
}

/// Group by retrieval month, then by material, summing kg and value.
/// Repeat materials within a month merge into one entry.
pub fn material_by_month(records: &[CollectionRecord], order: MonthOrder) -> Vec<MonthBucket> {
    let mut months: BTreeMap<(i32, u32), BTreeMap<&str, (f64, f64)>> = BTreeMap::new();
    for r in records {
        let retrieved = r.pickup.retrieved_at;
        let entry = months
            .entry((retrieved.year(), retrieved.month()))
            .or_default()
            .entry(r.material_name())
            .or_insert((0.0, 0.0));
        entry.0 += r.quantity_kg;
        entry.1 += r.value;
    }

    let mut buckets: Vec<MonthBucket> = months
        .into_iter()
        .map(|((year, month), materials)| MonthBucket {
            label: month_label(year, month),
            year,
            month,
            materials: materials
                .into_iter()
                .map(|(material, (quantity_kg, value))| MaterialMonthTotal {
                    material: material.to_string(),
                    quantity_kg,
                    value,
                })
                .collect(),
        })
        .collect();

    // BTreeMap iteration is already chronological.
    if order == MonthOrder::Lexicographic {
        buckets.sort_by(|a, b| a.label.cmp(&b.label));
    }
    buckets
}

/// Monetary total per month, derived from the material buckets.
pub fn value_by_month(buckets: &[MonthBucket]) -> Vec<MonthlyValue> {
    buckets
        .iter()
        .map(|b| MonthlyValue { month: b.label.clone(), value: b.total_value() })
        .collect()
}

// ── Month over month ─────────────────────────────────────────────────────────

/// Percent change truncates toward zero; a zero previous total reports 0%.
pub fn month_over_month(current: i64, previous: i64) -> MonthOverMonth {
    let percent_change = if previous == 0 {
        0
    } else {
        ((current - previous) as f64 / previous as f64 * 100.0) as i64
    };
    MonthOverMonth { current, previous, percent_change }
}

/// Distinct pickups that produced at least one record.
pub fn collection_count(records: &[CollectionRecord]) -> i64 {
    records
        .iter()
        .map(|r| r.pickup.id)
        .collect::<BTreeSet<_>>()
        .len() as i64
}

/// Bags requested across distinct pickups; each pickup counts once.
pub fn bag_count(records: &[CollectionRecord]) -> i64 {
    let mut bags: HashMap<i64, i64> = HashMap::new();
    for r in records {
        bags.insert(r.pickup.id, r.pickup.bag_count);
    }
    bags.values().sum()
}

// ── Daily curve ──────────────────────────────────────────────────────────────

/// Sum kg per day using each day's 00:00:00–23:59:59 retrieval window.
pub fn daily_curve(records: &[CollectionRecord], days: &[NaiveDate]) -> Vec<DailyTotal> {
    days.iter()
        .map(|&date| {
            let day = window::day_window(date);
            let total_kg = records
                .iter()
                .filter(|r| day.contains(r.pickup.retrieved_at))
                .map(|r| r.quantity_kg)
                .sum();
            DailyTotal { date, total_kg }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PickupEvent, PickupStatus, PriceCatalogEntry};
    use chrono::NaiveDateTime;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(10, 0, 0).unwrap()
    }

    fn record(id: i64, material: &str, kg: f64, when: NaiveDateTime) -> CollectionRecord {
        CollectionRecord {
            id,
            quantity_kg: kg,
            value: kg * 2.0,
            material: PriceCatalogEntry {
                id: 1,
                cooperative_id: 1,
                material: material.into(),
                unit_price: 2.0,
            },
            pickup: PickupEvent {
                id,
                cooperative_id: 1,
                condominium_id: 10,
                scheduled_at: when,
                retrieved_at: when,
                bag_count: 3,
                status: PickupStatus::Completed,
            },
        }
    }

    fn labels() -> Vec<String> {
        crate::config::ReportConfig::default().weekday_labels
    }

    #[test]
    fn empty_week_yields_seven_zero_buckets() {
        let curve = weekly_curve(&[], &labels());
        assert_eq!(curve.len(), 7);
        assert!(curve.iter().all(|d| d.total_kg == 0.0));
        assert_eq!(curve[0].label, "Segunda");
        assert_eq!(curve[6].label, "Domingo");
    }

    #[test]
    fn weekly_buckets_sum_to_window_total() {
        // 2024-05-06 is a Monday.
        let records = vec![
            record(1, "PET", 4.0, at(2024, 5, 6)),
            record(2, "Ferro", 1.5, at(2024, 5, 6)),
            record(3, "PET", 2.5, at(2024, 5, 12)),
        ];
        let curve = weekly_curve(&records, &labels());
        assert_eq!(curve[0].total_kg, 5.5);
        assert_eq!(curve[6].total_kg, 2.5);
        let sum: f64 = curve.iter().map(|d| d.total_kg).sum();
        assert_eq!(sum, total_kg(&records));
    }

    #[test]
    fn most_recycled_breaks_ties_by_name() {
        let records = vec![
            record(1, "Papelão", 3.0, at(2024, 5, 6)),
            record(2, "Ferro", 3.0, at(2024, 5, 7)),
        ];
        assert_eq!(most_recycled(&records).material, "Ferro");
        assert_eq!(most_recycled(&[]), MaterialTotal::none());
    }

    #[test]
    fn percentages_round_half_up_and_sum_near_100() {
        let records = vec![
            record(1, "PET", 1.0, at(2024, 5, 6)),
            record(2, "Ferro", 1.0, at(2024, 5, 6)),
            record(3, "Papelão", 1.0, at(2024, 5, 6)),
            record(4, "PET", 5.0, at(2024, 5, 7)),
        ];
        let shares = percentage_per_material(&records);
        let pet = shares.iter().find(|s| s.material == "PET").unwrap();
        assert_eq!(pet.percent, 75);
        // 12.5% rounds up to 13.
        let ferro = shares.iter().find(|s| s.material == "Ferro").unwrap();
        assert_eq!(ferro.percent, 13);

        let sum: i64 = shares.iter().map(|s| s.percent as i64).sum();
        assert!((sum - 100).abs() <= shares.len() as i64 - 1, "sum was {sum}");
    }

    #[test]
    fn zero_total_month_has_empty_breakdown() {
        assert!(percentage_per_material(&[]).is_empty());
        let weightless = vec![record(1, "PET", 0.0, at(2024, 5, 6))];
        assert!(percentage_per_material(&weightless).is_empty());
    }

    #[test]
    fn same_material_in_same_month_merges() {
        let records = vec![
            record(1, "PET", 2.0, at(2024, 3, 1)),
            record(2, "PET", 3.0, at(2024, 3, 20)),
            record(3, "Ferro", 1.0, at(2024, 3, 21)),
        ];
        let buckets = material_by_month(&records, MonthOrder::Chronological);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, "MARCH/2024");
        assert_eq!(buckets[0].materials.len(), 2);
        let pet = buckets[0].materials.iter().find(|m| m.material == "PET").unwrap();
        assert_eq!(pet.quantity_kg, 5.0);
        assert_eq!(pet.value, 10.0);
    }

    #[test]
    fn month_order_is_configurable() {
        let records = vec![
            record(1, "PET", 1.0, at(2024, 12, 5)),
            record(2, "PET", 1.0, at(2025, 1, 5)),
            record(3, "PET", 1.0, at(2024, 2, 5)),
        ];
        let lexical: Vec<String> = material_by_month(&records, MonthOrder::Lexicographic)
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(lexical, ["DECEMBER/2024", "FEBRUARY/2024", "JANUARY/2025"]);

        let chrono_order: Vec<String> = material_by_month(&records, MonthOrder::Chronological)
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(chrono_order, ["FEBRUARY/2024", "DECEMBER/2024", "JANUARY/2025"]);
    }

    #[test]
    fn value_by_month_sums_money_not_weight() {
        let records = vec![
            record(1, "PET", 2.0, at(2024, 3, 1)),
            record(2, "Ferro", 3.0, at(2024, 3, 2)),
        ];
        let buckets = material_by_month(&records, MonthOrder::Lexicographic);
        let values = value_by_month(&buckets);
        assert_eq!(values, vec![MonthlyValue { month: "MARCH/2024".into(), value: 10.0 }]);
    }

    #[test]
    fn month_over_month_guards_zero_previous() {
        assert_eq!(month_over_month(12, 0).percent_change, 0);
        assert_eq!(month_over_month(15, 10).percent_change, 50);
        // -33.33 truncates toward zero.
        assert_eq!(month_over_month(2, 3).percent_change, -33);
    }

    #[test]
    fn pickups_are_counted_once() {
        let mut a = record(1, "PET", 2.0, at(2024, 3, 1));
        let mut b = record(2, "Ferro", 1.0, at(2024, 3, 1));
        a.pickup.id = 7;
        b.pickup.id = 7;
        let c = record(3, "PET", 1.0, at(2024, 3, 2));
        let records = vec![a, b, c];
        assert_eq!(collection_count(&records), 2);
        assert_eq!(bag_count(&records), 6);
    }

    #[test]
    fn top_material_falls_back_on_empty_month() {
        assert_eq!(top_material_label(&[], "Não houve coletas"), "Não houve coletas");
        let records = vec![record(1, "Alumínio", 1.0, at(2024, 3, 1))];
        assert_eq!(top_material_label(&records, "-"), "Alumínio");
    }

    #[test]
    fn daily_curve_buckets_by_retrieval_day() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let days = window::daily_range(start, start + chrono::Days::new(7)).unwrap();
        let records = vec![
            record(1, "PET", 2.0, at(2024, 5, 1)),
            record(2, "PET", 3.0, at(2024, 5, 8)),
        ];
        let curve = daily_curve(&records, &days);
        assert_eq!(curve.len(), 8);
        assert_eq!(curve[0].total_kg, 2.0);
        assert_eq!(curve[7].total_kg, 3.0);
        assert!(curve[1..7].iter().all(|d| d.total_kg == 0.0));
    }
}

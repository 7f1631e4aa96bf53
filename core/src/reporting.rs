//! Reporting facade — picks the window, fetches, aggregates, encodes.
//!
//! RULES:
//!   - No business rule lives here beyond choosing the window, the date
//!     axis, the aggregation and the encoder for each report.
//!   - Every call reads the source afresh. Nothing is cached between calls.
//!   - Month-over-month figures come from two separate reads; under
//!     concurrent writes they may reflect slightly different moments.

use crate::{
    aggregation::{
        self, DailyTotal, DayTotal, MaterialShare, MaterialTotal, MonthBucket, MonthOverMonth,
        MonthlyValue, TopMaterials,
    },
    clock::Clock,
    config::ReportConfig,
    error::{ReportError, ReportResult},
    flat_file,
    model::CollectionRecord,
    source::CollectionSource,
    tabular,
    types::{CooperativeId, DateAxis, Subject},
    window::{self, TimeWindow},
};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Bytes of a finished export plus how to present them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name:    String,
    pub content_type: &'static str,
    pub bytes:        Vec<u8>,
}

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const FLAT_FILE_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub struct ReportingService<S, C> {
    source: S,
    clock:  C,
    config: ReportConfig,
}

impl<S: CollectionSource, C: Clock> ReportingService<S, C> {
    /// Fails if `config` does not pass ReportConfig::validate().
    pub fn new(source: S, clock: C, config: ReportConfig) -> ReportResult<Self> {
        config.validate()?;
        Ok(Self { source, clock, config })
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn fetch(
        &self,
        subject: Subject,
        axis: DateAxis,
        window: &TimeWindow,
    ) -> ReportResult<Vec<CollectionRecord>> {
        let records = self.source.records_in_window(subject, axis, window)?;
        log::debug!(
            "{subject:?}: {} records on {axis:?} axis in [{}, {}]",
            records.len(),
            window.start,
            window.end
        );
        Ok(records)
    }

    /// Records for the current and the previous calendar month, by retrieval.
    fn month_pair(
        &self,
        subject: Subject,
    ) -> ReportResult<(Vec<CollectionRecord>, Vec<CollectionRecord>)> {
        let today = self.today();
        let current = self.fetch(subject, DateAxis::Retrieval, &window::month_window(today))?;
        let previous =
            self.fetch(subject, DateAxis::Retrieval, &window::previous_month_window(today))?;
        Ok((current, previous))
    }

    // ── Weekly ─────────────────────────────────────────────────

    pub fn weekly_recycling_curve(&self, subject: Subject) -> ReportResult<Vec<DayTotal>> {
        let records = self.fetch(subject, DateAxis::Scheduled, &window::week_window(self.now()))?;
        Ok(aggregation::weekly_curve(&records, &self.config.weekday_labels))
    }

    pub fn total_collected_last_week(&self, subject: Subject) -> ReportResult<f64> {
        let records = self.fetch(subject, DateAxis::Scheduled, &window::week_window(self.now()))?;
        Ok(aggregation::total_kg(&records))
    }

    pub fn most_recycled_last_week(&self, subject: Subject) -> ReportResult<MaterialTotal> {
        let records = self.fetch(subject, DateAxis::Scheduled, &window::week_window(self.now()))?;
        Ok(aggregation::most_recycled(&records))
    }

    // ── Monthly ────────────────────────────────────────────────

    pub fn material_mix_this_month(&self, subject: Subject) -> ReportResult<Vec<MaterialShare>> {
        let records =
            self.fetch(subject, DateAxis::Retrieval, &window::month_window(self.today()))?;
        Ok(aggregation::percentage_per_material(&records))
    }

    pub fn total_value_last_month(&self, subject: Subject) -> ReportResult<f64> {
        let records =
            self.fetch(subject, DateAxis::Retrieval, &window::trailing_month_window(self.now()))?;
        Ok(aggregation::total_value(&records))
    }

    pub fn collections_month_over_month(&self, subject: Subject) -> ReportResult<MonthOverMonth> {
        let (current, previous) = self.month_pair(subject)?;
        Ok(aggregation::month_over_month(
            aggregation::collection_count(&current),
            aggregation::collection_count(&previous),
        ))
    }

    pub fn bags_month_over_month(&self, subject: Subject) -> ReportResult<MonthOverMonth> {
        let (current, previous) = self.month_pair(subject)?;
        Ok(aggregation::month_over_month(
            aggregation::bag_count(&current),
            aggregation::bag_count(&previous),
        ))
    }

    pub fn top_materials(&self, subject: Subject) -> ReportResult<TopMaterials> {
        let (current, previous) = self.month_pair(subject)?;
        let fallback = &self.config.no_collections_label;
        Ok(TopMaterials {
            current_month:  aggregation::top_material_label(&current, fallback),
            previous_month: aggregation::top_material_label(&previous, fallback),
        })
    }

    // ── Trailing year ──────────────────────────────────────────

    pub fn kg_per_material_per_month(&self, subject: Subject) -> ReportResult<Vec<MonthBucket>> {
        let records =
            self.fetch(subject, DateAxis::Retrieval, &window::year_trailing_window(self.now()))?;
        Ok(aggregation::material_by_month(&records, self.config.month_order))
    }

    pub fn value_received_per_month(&self, subject: Subject) -> ReportResult<Vec<MonthlyValue>> {
        let buckets = self.kg_per_material_per_month(subject)?;
        Ok(aggregation::value_by_month(&buckets))
    }

    // ── Daily ──────────────────────────────────────────────────

    /// One entry per day of `start..=end`; the range must span exactly 7 days.
    pub fn daily_collection_curve(
        &self,
        subject: Subject,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReportResult<Vec<DailyTotal>> {
        let days = window::daily_range(start, end)?;
        let span = TimeWindow::new(
            window::day_window(start).start,
            window::day_window(end).end,
        );
        let records = self.fetch(subject, DateAxis::Retrieval, &span)?;
        Ok(aggregation::daily_curve(&records, &days))
    }

    pub fn collections(&self, subject: Subject) -> ReportResult<Vec<CollectionRecord>> {
        self.source.records_for_subject(subject)
    }

    // ── Exports ────────────────────────────────────────────────

    /// One cooperative, or all of them ordered by tax id.
    pub fn cooperatives_csv(&self, id: Option<CooperativeId>) -> ReportResult<Export> {
        let mut cooperatives = match id {
            Some(id) => vec![self.source.cooperative(id)?],
            None => self.source.cooperatives()?,
        };
        cooperatives.sort_by(|a, b| a.tax_id.cmp(&b.tax_id));
        let bytes = tabular::encode(&cooperatives)?;
        log::info!("Exported {} cooperatives as CSV", cooperatives.len());
        Ok(Export {
            file_name: "cooperativas.csv".into(),
            content_type: CSV_CONTENT_TYPE,
            bytes,
        })
    }

    pub fn kg_per_month_csv(&self, subject: Subject) -> ReportResult<Export> {
        let buckets = self.kg_per_material_per_month(subject)?;
        let bytes = tabular::encode(&buckets)?;
        log::info!("Exported {} monthly material buckets for {subject:?}", buckets.len());
        Ok(Export {
            file_name: "material_por_mes.csv".into(),
            content_type: CSV_CONTENT_TYPE,
            bytes,
        })
    }

    pub fn value_per_month_csv(&self, subject: Subject) -> ReportResult<Export> {
        let values = self.value_received_per_month(subject)?;
        let bytes = tabular::encode(&values)?;
        log::info!("Exported {} monthly values for {subject:?}", values.len());
        Ok(Export {
            file_name: "valor_por_mes.csv".into(),
            content_type: CSV_CONTENT_TYPE,
            bytes,
        })
    }

    pub fn cooperative_flat_file(&self, id: CooperativeId) -> ReportResult<Export> {
        let cooperative = self.source.cooperative(id)?;
        let catalog = self.source.price_catalog(id)?;
        let records = flat_file::records_for(
            &cooperative,
            &catalog,
            &self.config.canonical_materials,
            self.now(),
        );
        let bytes = flat_file::encode(&records)?;
        log::info!("Exported flat file for cooperative {id} ({} records)", records.len());
        Ok(Export {
            file_name: format!("cooperativa_{id}.txt"),
            content_type: FLAT_FILE_CONTENT_TYPE,
            bytes,
        })
    }

    // ── Dispatch by name ───────────────────────────────────────

    pub fn run(&self, request: &ReportRequest) -> ReportResult<ReportOutput> {
        let kind = request.kind;
        let subject = || -> ReportResult<Subject> {
            request.subject.ok_or_else(|| {
                ReportError::Other(anyhow::anyhow!("report '{kind}' needs a cooperative or condominium"))
            })
        };
        let cooperative_id = || -> ReportResult<CooperativeId> {
            match subject()? {
                Subject::Cooperative(id) => Ok(id),
                other => Err(ReportError::Other(anyhow::anyhow!(
                    "report '{kind}' needs a cooperative, got {other:?}"
                ))),
            }
        };

        let output = match kind {
            ReportKind::WeeklyCurve => structured(&self.weekly_recycling_curve(subject()?)?)?,
            ReportKind::WeeklyTotal => structured(&self.total_collected_last_week(subject()?)?)?,
            ReportKind::MostRecycled => structured(&self.most_recycled_last_week(subject()?)?)?,
            ReportKind::MaterialMix => structured(&self.material_mix_this_month(subject()?)?)?,
            ReportKind::ValueLastMonth => structured(&self.total_value_last_month(subject()?)?)?,
            ReportKind::KgPerMonth => structured(&self.kg_per_material_per_month(subject()?)?)?,
            ReportKind::ValuePerMonth => structured(&self.value_received_per_month(subject()?)?)?,
            ReportKind::CollectionsMom => structured(&self.collections_month_over_month(subject()?)?)?,
            ReportKind::BagsMom => structured(&self.bags_month_over_month(subject()?)?)?,
            ReportKind::TopMaterials => structured(&self.top_materials(subject()?)?)?,
            ReportKind::DailyCurve => {
                let today = self.today();
                let start = match request.from {
                    Some(from) => from,
                    None => today
                        .checked_sub_days(Days::new(window::DAILY_RANGE_DAYS))
                        .ok_or(ReportError::InvalidDateRange { start: today, end: today })?,
                };
                let end = start
                    .checked_add_days(Days::new(window::DAILY_RANGE_DAYS))
                    .ok_or(ReportError::InvalidDateRange { start, end: start })?;
                structured(&self.daily_collection_curve(subject()?, start, end)?)?
            }
            ReportKind::CooperativesCsv => {
                let id = match request.subject {
                    Some(_) => Some(cooperative_id()?),
                    None => None,
                };
                ReportOutput::File(self.cooperatives_csv(id)?)
            }
            ReportKind::KgPerMonthCsv => ReportOutput::File(self.kg_per_month_csv(subject()?)?),
            ReportKind::ValuePerMonthCsv => ReportOutput::File(self.value_per_month_csv(subject()?)?),
            ReportKind::FlatFile => ReportOutput::File(self.cooperative_flat_file(cooperative_id()?)?),
        };
        Ok(output)
    }
}

fn structured<T: Serialize>(value: &T) -> ReportResult<ReportOutput> {
    Ok(ReportOutput::Structured(serde_json::to_value(value)?))
}

/// What a named report produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput {
    Structured(serde_json::Value),
    File(Export),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub kind:    ReportKind,
    pub subject: Option<Subject>,
    /// First day of a daily curve. Defaults to seven days ago.
    pub from:    Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    WeeklyCurve,
    WeeklyTotal,
    MostRecycled,
    MaterialMix,
    ValueLastMonth,
    KgPerMonth,
    ValuePerMonth,
    CollectionsMom,
    BagsMom,
    TopMaterials,
    DailyCurve,
    CooperativesCsv,
    KgPerMonthCsv,
    ValuePerMonthCsv,
    FlatFile,
}

impl ReportKind {
    pub const ALL: [ReportKind; 15] = [
        ReportKind::WeeklyCurve,
        ReportKind::WeeklyTotal,
        ReportKind::MostRecycled,
        ReportKind::MaterialMix,
        ReportKind::ValueLastMonth,
        ReportKind::KgPerMonth,
        ReportKind::ValuePerMonth,
        ReportKind::CollectionsMom,
        ReportKind::BagsMom,
        ReportKind::TopMaterials,
        ReportKind::DailyCurve,
        ReportKind::CooperativesCsv,
        ReportKind::KgPerMonthCsv,
        ReportKind::ValuePerMonthCsv,
        ReportKind::FlatFile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::WeeklyCurve      => "weekly-curve",
            ReportKind::WeeklyTotal      => "weekly-total",
            ReportKind::MostRecycled     => "most-recycled",
            ReportKind::MaterialMix      => "material-mix",
            ReportKind::ValueLastMonth   => "value-last-month",
            ReportKind::KgPerMonth       => "kg-per-month",
            ReportKind::ValuePerMonth    => "value-per-month",
            ReportKind::CollectionsMom   => "collections-mom",
            ReportKind::BagsMom          => "bags-mom",
            ReportKind::TopMaterials     => "top-materials",
            ReportKind::DailyCurve       => "daily-curve",
            ReportKind::CooperativesCsv  => "cooperatives-csv",
            ReportKind::KgPerMonthCsv    => "kg-per-month-csv",
            ReportKind::ValuePerMonthCsv => "value-per-month-csv",
            ReportKind::FlatFile         => "flat-file",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                log::warn!("Unknown report name '{s}'");
                ReportError::Other(anyhow::anyhow!("unknown report '{s}'"))
            })
    }
}

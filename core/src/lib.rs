//! coleta-core: collection reporting and analytics for recycling cooperatives.
//!
//! Raw collection records come in through a CollectionSource; the engine
//! turns them into time-bucketed statistics and encodes exports as
//! semicolon-delimited tables or fixed-width flat files.

pub mod aggregation;
pub mod clock;
pub mod config;
pub mod error;
pub mod flat_file;
pub mod model;
pub mod reporting;
pub mod source;
pub mod store;
pub mod tabular;
pub mod types;
pub mod window;

pub use error::{ReportError, ReportResult};
pub use reporting::{Export, ReportKind, ReportOutput, ReportRequest, ReportingService};

//! Data module - loading, records and aggregation

mod aggregate;
mod loader;
mod record;
mod source;

pub use aggregate::{AggregationEngine, RegionOption, RegionSeries, NATIONAL_CODE};
pub use loader::{ColumnNames, DataLoader, LoadedTable};
pub use record::{format_period, Category, Record};
pub use source::{SourceError, SourceLocation};

//! Brand insights reporting — aggregation of campaign metric tables into
//! per-group summaries with derived CTR, cost and ROI, plus CSV/JSON export.

pub mod aggregator;
pub mod decode;
pub mod report;

pub use aggregator::{aggregate, AggregateRow, Aggregator, CostModel, Derived};
pub use decode::read_rows;
pub use report::{InsightsReport, InsightsSummary};

//! Brand insights report — wraps aggregated rows with run metadata and
//! exports them as CSV or JSON.

use crate::aggregator::{aggregate, AggregateRow};
use campaign_core::config::ExportFormat;
use campaign_core::parse::saturate;
use campaign_core::types::{RawRow, OUTPUT_COLUMNS};
use campaign_core::{CampaignError, CampaignResult};
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

pub use campaign_core::config::DEFAULT_EXPORT_FILE_NAME;

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8;";
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub groups: usize,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub total_budget_burnt: f64,
    pub total_a2c: f64,
    pub total_gmv: f64,
    pub conversions: i64,
    pub total_cost: f64,
    pub overall_ctr: f64,
    pub overall_roi: f64,
}

impl InsightsSummary {
    pub fn from_rows(rows: &[AggregateRow]) -> Self {
        let mut summary = InsightsSummary {
            groups: rows.len(),
            ..Default::default()
        };
        for row in rows {
            let m = &row.metrics;
            summary.total_impressions = summary.total_impressions.saturating_add(m.total_impressions);
            summary.total_clicks = summary.total_clicks.saturating_add(m.total_clicks);
            summary.total_budget_burnt = saturate(summary.total_budget_burnt + m.total_budget_burnt);
            summary.total_a2c = saturate(summary.total_a2c + m.total_a2c);
            summary.total_gmv = saturate(summary.total_gmv + m.total_gmv);
            summary.conversions = summary.conversions.saturating_add(m.conversions);
            summary.total_cost = saturate(summary.total_cost + row.derived.cost);
        }

        summary.overall_ctr = if summary.total_impressions > 0 {
            summary.total_clicks as f64 / summary.total_impressions as f64
        } else {
            0.0
        };
        summary.overall_roi = if summary.total_cost != 0.0 {
            saturate(summary.total_gmv / summary.total_cost)
        } else {
            0.0
        };
        summary
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub input_rows: usize,
    pub rows: Vec<AggregateRow>,
    pub summary: InsightsSummary,
}

/// Cells of one row in `OUTPUT_COLUMNS` order, group-by values as strings
/// and metrics as JSON numbers.
fn json_record(row: &AggregateRow) -> Vec<(&'static str, Value)> {
    let m = &row.metrics;
    let d = &row.derived;
    let numbers = [
        json!(m.total_impressions),
        json!(m.total_budget),
        json!(m.total_budget_burnt),
        json!(m.total_clicks),
        json!(m.total_a2c),
        json!(m.total_gmv),
        json!(m.conversions),
        json!(m.ecpm),
        json!(m.ecpc),
        json!(d.total_ctr),
        json!(d.a2c_rate),
        json!(d.cost),
        json!(d.total_roi),
    ];

    let cells = row.key.values().into_iter().map(|v| json!(v)).chain(numbers);
    OUTPUT_COLUMNS.into_iter().zip(cells).collect()
}

/// Serializes one row as a JSON object in output column order.
struct RecordView<'a>(&'a AggregateRow);

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = json_record(self.0);
        let mut map = serializer.serialize_map(Some(record.len()))?;
        for (column, value) in &record {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

impl InsightsReport {
    /// Aggregate `rows` and stamp the result.
    pub fn build(rows: &[RawRow]) -> Self {
        let aggregated = aggregate(rows);
        let summary = InsightsSummary::from_rows(&aggregated);

        info!(
            input_rows = rows.len(),
            groups = summary.groups,
            total_cost = summary.total_cost,
            "Brand insights aggregated"
        );

        Self {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            input_rows: rows.len(),
            rows: aggregated,
            summary,
        }
    }

    pub fn export(&self, format: ExportFormat) -> CampaignResult<String> {
        match format {
            ExportFormat::Csv => self.export_csv(),
            ExportFormat::Json => self.export_json(),
        }
    }

    /// Header of `OUTPUT_COLUMNS`, one line per group, RFC 4180 quoting.
    pub fn export_csv(&self) -> CampaignResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(OUTPUT_COLUMNS)
            .map_err(|e| CampaignError::Export(e.to_string()))?;
        for row in &self.rows {
            let cells = row.to_record().into_iter().map(|(_, value)| value);
            writer
                .write_record(cells)
                .map_err(|e| CampaignError::Export(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CampaignError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CampaignError::Export(e.to_string()))
    }

    pub fn export_json(&self) -> CampaignResult<String> {
        let records: Vec<RecordView<'_>> = self.rows.iter().map(RecordView).collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample() -> Vec<RawRow> {
        vec![
            row(&[
                (CAMPAIGN_NAME, "Summer Sale"),
                (BIDDING_TYPE, "CPM"),
                (TOTAL_IMPRESSIONS, "1000"),
                (ECPM, "0.5"),
                (TOTAL_CLICKS, "20"),
                (TOTAL_GMV, "1000"),
            ]),
            row(&[
                (CAMPAIGN_NAME, "Brand, \"Hero\""),
                (BIDDING_TYPE, "CPC"),
                (TOTAL_IMPRESSIONS, "500"),
                (TOTAL_CLICKS, "30"),
                (ECPC, "2"),
                (TOTAL_GMV, "300"),
            ]),
        ]
    }

    #[test]
    fn test_build_summary() {
        let report = InsightsReport::build(&sample());
        assert_eq!(report.input_rows, 2);
        assert_eq!(report.summary.groups, 2);
        assert_eq!(report.summary.total_impressions, 1500);
        assert_eq!(report.summary.total_clicks, 50);
        // 1000 * 0.5 + 30 * 2
        assert_eq!(report.summary.total_cost, 560.0);
        assert_eq!(report.summary.overall_roi, 1300.0 / 560.0);
    }

    #[test]
    fn test_summary_totals_saturate() {
        let huge = row(&[(BIDDING_TYPE, "CPM"), (TOTAL_IMPRESSIONS, "1"), (ECPM, "1e308"), (TOTAL_GMV, "1e308")]);
        let mut other = huge.clone();
        other.insert(CAMPAIGN_ID.into(), "c2".into());
        let report = InsightsReport::build(&[huge, other]);
        assert_eq!(report.summary.total_gmv, f64::MAX);
        assert_eq!(report.summary.total_cost, f64::MAX);
        assert_eq!(report.summary.overall_roi, 1.0);
    }

    #[test]
    fn test_empty_summary_has_no_nan() {
        let report = InsightsReport::build(&[]);
        assert_eq!(report.summary, InsightsSummary::default());
        assert!(report.rows.is_empty());
    }

    #[test]
    fn test_csv_export() {
        let report = InsightsReport::build(&sample());
        let csv = report.export(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), OUTPUT_COLUMNS.join(","));
        assert!(lines.next().unwrap().starts_with("Unknown,Unknown,Summer Sale,"));
        assert!(csv.contains("\"Brand, \"\"Hero\"\"\""));
        assert_eq!(csv.lines().count(), 3); // header + 2 groups
    }

    #[test]
    fn test_csv_export_empty_has_header_only() {
        let report = InsightsReport::build(&[]);
        let csv = report.export_csv().unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_json_export_preserves_column_order() {
        let report = InsightsReport::build(&sample());
        let json = report.export(ExportFormat::Json).unwrap();
        let parsed: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0][CAMPAIGN_NAME], "Summer Sale");
        assert_eq!(parsed[1][COST], 60.0);
        assert_eq!(parsed[0][TOTAL_IMPRESSIONS], 1000);
        assert_eq!(parsed[0][TOTAL_CTR], 0.02);
        assert!(parsed[1][CAMPAIGN_ID].is_string());

        let first = json.find(METRICS_DATE).unwrap();
        let last = json.find(TOTAL_ROI).unwrap();
        assert!(first < last);
    }
}

use crate::parse::{parse_float, parse_int, saturate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One decoded input record: column name to raw cell text.
pub type RawRow = HashMap<String, String>;

/// Placeholder for an absent or empty group-by value.
pub const UNKNOWN: &str = "Unknown";

pub const METRICS_DATE: &str = "METRICS_DATE";
pub const CAMPAIGN_ID: &str = "CAMPAIGN_ID";
pub const CAMPAIGN_NAME: &str = "CAMPAIGN_NAME";
pub const CAMPAIGN_START_DATE: &str = "CAMPAIGN_START_DATE";
pub const CAMPAIGN_END_DATE: &str = "CAMPAIGN_END_DATE";
pub const CAMPAIGN_STATUS: &str = "CAMPAIGN_STATUS";
pub const BIDDING_TYPE: &str = "BIDDING_TYPE";
pub const AD_PROPERTY: &str = "AD_PROPERTY";
pub const KEYWORD: &str = "KEYWORD";
pub const BRAND_NAME: &str = "BRAND_NAME";

pub const ECPM: &str = "eCPM";
pub const ECPC: &str = "eCPC";
pub const TOTAL_IMPRESSIONS: &str = "TOTAL_IMPRESSIONS";
pub const TOTAL_BUDGET: &str = "TOTAL_BUDGET";
pub const TOTAL_BUDGET_BURNT: &str = "TOTAL_BUDGET_BURNT";
pub const TOTAL_CLICKS: &str = "TOTAL_CLICKS";
pub const TOTAL_A2C: &str = "TOTAL_A2C";
pub const TOTAL_GMV: &str = "TOTAL_GMV";
pub const CONVERSIONS: &str = "CONVERSIONS";

pub const TOTAL_CTR: &str = "TOTAL_CTR";
pub const A2C_RATE: &str = "A2C_RATE";
pub const COST: &str = "cost";
pub const TOTAL_ROI: &str = "TOTAL_ROI";

/// Group-by columns, in key order.
pub const GROUP_BY_COLUMNS: [&str; 10] = [
    METRICS_DATE,
    CAMPAIGN_ID,
    CAMPAIGN_NAME,
    CAMPAIGN_START_DATE,
    CAMPAIGN_END_DATE,
    CAMPAIGN_STATUS,
    BIDDING_TYPE,
    AD_PROPERTY,
    KEYWORD,
    BRAND_NAME,
];

/// Accumulated metric columns, in output order.
pub const METRIC_COLUMNS: [&str; 9] = [
    TOTAL_IMPRESSIONS,
    TOTAL_BUDGET,
    TOTAL_BUDGET_BURNT,
    TOTAL_CLICKS,
    TOTAL_A2C,
    TOTAL_GMV,
    CONVERSIONS,
    ECPM,
    ECPC,
];

/// Ratio columns computed after accumulation.
pub const DERIVED_COLUMNS: [&str; 4] = [TOTAL_CTR, A2C_RATE, COST, TOTAL_ROI];

/// Full output header: group-by, then accumulated, then derived.
pub const OUTPUT_COLUMNS: [&str; 23] = [
    METRICS_DATE,
    CAMPAIGN_ID,
    CAMPAIGN_NAME,
    CAMPAIGN_START_DATE,
    CAMPAIGN_END_DATE,
    CAMPAIGN_STATUS,
    BIDDING_TYPE,
    AD_PROPERTY,
    KEYWORD,
    BRAND_NAME,
    TOTAL_IMPRESSIONS,
    TOTAL_BUDGET,
    TOTAL_BUDGET_BURNT,
    TOTAL_CLICKS,
    TOTAL_A2C,
    TOTAL_GMV,
    CONVERSIONS,
    ECPM,
    ECPC,
    TOTAL_CTR,
    A2C_RATE,
    COST,
    TOTAL_ROI,
];

/// Composite grouping key. Used directly as a map key, so values may
/// contain any character without colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub metrics_date: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub campaign_start_date: String,
    pub campaign_end_date: String,
    pub campaign_status: String,
    pub bidding_type: String,
    pub ad_property: String,
    pub keyword: String,
    pub brand_name: String,
}

impl GroupKey {
    /// Build the key for a row. Only a missing column or an empty string
    /// falls back to [`UNKNOWN`]; `"0"` or whitespace are real values.
    pub fn from_row(row: &RawRow) -> Self {
        let field = |column: &str| match row.get(column) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => UNKNOWN.to_string(),
        };

        Self {
            metrics_date: field(METRICS_DATE),
            campaign_id: field(CAMPAIGN_ID),
            campaign_name: field(CAMPAIGN_NAME),
            campaign_start_date: field(CAMPAIGN_START_DATE),
            campaign_end_date: field(CAMPAIGN_END_DATE),
            campaign_status: field(CAMPAIGN_STATUS),
            bidding_type: field(BIDDING_TYPE),
            ad_property: field(AD_PROPERTY),
            keyword: field(KEYWORD),
            brand_name: field(BRAND_NAME),
        }
    }

    /// Values in [`GROUP_BY_COLUMNS`] order.
    pub fn values(&self) -> [&str; 10] {
        [
            &self.metrics_date,
            &self.campaign_id,
            &self.campaign_name,
            &self.campaign_start_date,
            &self.campaign_end_date,
            &self.campaign_status,
            &self.bidding_type,
            &self.ad_property,
            &self.keyword,
            &self.brand_name,
        ]
    }
}

/// Numeric columns of a row or of an accumulated group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub ecpm: f64,
    pub ecpc: f64,
    pub total_impressions: i64,
    pub total_budget: i64,
    pub total_budget_burnt: f64,
    pub total_clicks: i64,
    pub total_a2c: f64,
    pub total_gmv: f64,
    pub conversions: i64,
}

impl Metrics {
    /// Extract the numeric columns of a row, zero where missing or malformed.
    pub fn from_row(row: &RawRow) -> Self {
        let cell = |column: &str| row.get(column).map(String::as_str);

        Self {
            ecpm: parse_float(cell(ECPM)),
            ecpc: parse_float(cell(ECPC)),
            total_impressions: parse_int(cell(TOTAL_IMPRESSIONS)),
            total_budget: parse_int(cell(TOTAL_BUDGET)),
            total_budget_burnt: parse_float(cell(TOTAL_BUDGET_BURNT)),
            total_clicks: parse_int(cell(TOTAL_CLICKS)),
            total_a2c: parse_float(cell(TOTAL_A2C)),
            total_gmv: parse_float(cell(TOTAL_GMV)),
            conversions: parse_int(cell(CONVERSIONS)),
        }
    }

    /// Fold another row into this accumulator: rates and budget keep the
    /// maximum, volumes are summed. Sums saturate instead of overflowing.
    pub fn absorb(&mut self, other: &Metrics) {
        self.ecpm = self.ecpm.max(other.ecpm);
        self.ecpc = self.ecpc.max(other.ecpc);
        self.total_budget = self.total_budget.max(other.total_budget);

        self.total_impressions = self.total_impressions.saturating_add(other.total_impressions);
        self.total_budget_burnt = saturate(self.total_budget_burnt + other.total_budget_burnt);
        self.total_clicks = self.total_clicks.saturating_add(other.total_clicks);
        self.total_a2c = saturate(self.total_a2c + other.total_a2c);
        self.total_gmv = saturate(self.total_gmv + other.total_gmv);
        self.conversions = self.conversions.saturating_add(other.conversions);
    }
}

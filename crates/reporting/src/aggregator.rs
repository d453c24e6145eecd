//! Brand insights aggregation — collapses raw campaign metric rows into one
//! row per group key and derives CTR, add-to-cart rate, cost and ROI.

use campaign_core::parse::saturate;
use campaign_core::types::{GroupKey, Metrics, RawRow, OUTPUT_COLUMNS};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use tracing::debug;

// ─── Types ──────────────────────────────────────────────────────────────────

/// Which volume the group's spend is charged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    Cpm,
    Cpc,
}

impl CostModel {
    /// CPM when the bidding type mentions "CPM" in any case, otherwise CPC.
    /// An unknown bidding type is therefore charged per click.
    pub fn for_bidding_type(bidding_type: &str) -> Self {
        if bidding_type.to_ascii_uppercase().contains("CPM") {
            CostModel::Cpm
        } else {
            CostModel::Cpc
        }
    }
}

/// Ratios computed once per group after all rows are folded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    pub total_ctr: f64,
    pub a2c_rate: f64,
    pub cost: f64,
    pub total_roi: f64,
}

impl Derived {
    pub fn compute(key: &GroupKey, metrics: &Metrics) -> Self {
        let impressions = metrics.total_impressions as f64;
        let clicks = metrics.total_clicks as f64;

        let (total_ctr, a2c_rate) = if metrics.total_impressions == 0 {
            (0.0, 0.0)
        } else {
            (clicks / impressions, metrics.total_a2c / impressions)
        };

        let cost = saturate(match CostModel::for_bidding_type(&key.bidding_type) {
            CostModel::Cpm => impressions * metrics.ecpm,
            CostModel::Cpc => clicks * metrics.ecpc,
        });

        let total_roi = if cost == 0.0 {
            0.0
        } else {
            saturate(metrics.total_gmv / cost)
        };

        Self {
            total_ctr,
            a2c_rate,
            cost,
            total_roi,
        }
    }
}

/// One output row: the group key, its folded metrics and derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub metrics: Metrics,
    pub derived: Derived,
}

impl AggregateRow {
    /// Cells in `OUTPUT_COLUMNS` order, rendered as text.
    pub fn to_record(&self) -> Vec<(&'static str, String)> {
        let m = &self.metrics;
        let d = &self.derived;
        let numbers = [
            m.total_impressions.to_string(),
            m.total_budget.to_string(),
            m.total_budget_burnt.to_string(),
            m.total_clicks.to_string(),
            m.total_a2c.to_string(),
            m.total_gmv.to_string(),
            m.conversions.to_string(),
            m.ecpm.to_string(),
            m.ecpc.to_string(),
            d.total_ctr.to_string(),
            d.a2c_rate.to_string(),
            d.cost.to_string(),
            d.total_roi.to_string(),
        ];

        let cells = self
            .key
            .values()
            .into_iter()
            .map(str::to_string)
            .chain(numbers);
        OUTPUT_COLUMNS.into_iter().zip(cells).collect()
    }

    /// The output row as an input record, so a finished table can be
    /// aggregated again.
    pub fn to_raw_row(&self) -> RawRow {
        self.to_record()
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .collect()
    }
}

// ─── Aggregator ─────────────────────────────────────────────────────────────

/// Keyed accumulator. Groups keep the position of their first row.
#[derive(Debug, Default)]
pub struct Aggregator {
    index: HashMap<GroupKey, usize>,
    groups: Vec<(GroupKey, Metrics)>,
    rows_ingested: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: &RawRow) {
        self.rows_ingested += 1;
        let key = GroupKey::from_row(row);
        let metrics = Metrics::from_row(row);

        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.absorb(&metrics),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, metrics));
            }
        }
    }

    /// Number of distinct groups seen so far.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn rows_ingested(&self) -> usize {
        self.rows_ingested
    }

    /// Compute derived ratios and return groups in first-seen order.
    pub fn finish(self) -> Vec<AggregateRow> {
        metrics::counter!("insights.rows_ingested").increment(self.rows_ingested as u64);
        metrics::counter!("insights.groups_emitted").increment(self.groups.len() as u64);
        debug!(
            rows = self.rows_ingested,
            groups = self.groups.len(),
            "Aggregation finished"
        );

        self.groups
            .into_iter()
            .map(|(key, metrics)| {
                let derived = Derived::compute(&key, &metrics);
                AggregateRow {
                    key,
                    metrics,
                    derived,
                }
            })
            .collect()
    }
}

/// Aggregate a full table of rows in one call.
pub fn aggregate<I>(rows: I) -> Vec<AggregateRow>
where
    I: IntoIterator,
    I::Item: Borrow<RawRow>,
{
    let mut aggregator = Aggregator::new();
    for row in rows {
        aggregator.push(row.borrow());
    }
    aggregator.finish()
}

// ─── Tests ──────────────────────────────────────────────────────────────────

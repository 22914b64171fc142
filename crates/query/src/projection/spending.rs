//! Time-series shape for `search/spending_over_time/`.

use super::lenient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Grouping key passed through to the upstream time-series endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingGroup {
    #[default]
    FiscalYear,
    Quarter,
    Month,
}

impl SpendingGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingGroup::FiscalYear => "fiscal_year",
            SpendingGroup::Quarter => "quarter",
            SpendingGroup::Month => "month",
        }
    }
}

/// One bucket of the time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPeriod {
    /// "FY2024", "FY2024 Q2", "FY2024 M03"
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Default, Deserialize)]
struct RawTimePeriod {
    #[serde(default, deserialize_with = "lenient::string")]
    fiscal_year: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    quarter: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSpendingRow {
    #[serde(default, deserialize_with = "lenient::nested")]
    time_period: Option<RawTimePeriod>,
    #[serde(default, deserialize_with = "lenient::amount")]
    aggregated_amount: Option<f64>,
}

impl SpendingPeriod {
    /// A missing amount counts as zero spending for the bucket.
    pub fn from_raw(value: Value) -> Self {
        let row: RawSpendingRow = lenient::record(value);
        let period = row.time_period.unwrap_or_default();
        let label = period_label(&period);
        Self {
            label,
            fiscal_year: period.fiscal_year,
            quarter: period.quarter,
            month: period.month,
            amount: row.aggregated_amount.unwrap_or(0.0),
        }
    }
}

fn period_label(period: &RawTimePeriod) -> String {
    let year = period.fiscal_year.as_deref().unwrap_or("unknown");
    match (&period.quarter, &period.month) {
        (Some(q), _) => format!("FY{year} Q{q}"),
        (None, Some(m)) => match m.parse::<u32>() {
            Ok(n) => format!("FY{year} M{n:02}"),
            Err(_) => format!("FY{year} M{m}"),
        },
        (None, None) => format!("FY{year}"),
    }
}

//! Field projection tables.
//!
//! For each search endpoint family this module declares the exact field list
//! to request and the mapping from one raw row to a [`NormalizedResult`].
//! Raw rows are decoded into typed shapes at this boundary; nothing past it
//! handles untyped maps.

pub mod award;
mod lenient;
pub mod recipient;
pub mod spending;

pub use award::{
    AWARD_FIELDS, AwardDetailRecord, AwardRecord, COMPETITION_FIELDS, IdvChildRecord,
    NormalizedResult, RawRecord, TRANSACTION_FIELDS, TransactionRecord, new_awards_only,
};
pub use lenient::CodeLabel;
pub use recipient::{RecipientMatch, RecipientProfile};
pub use spending::{SpendingGroup, SpendingPeriod};

use serde::Deserialize;
use serde_json::Value;

/// The search endpoint families and how each is projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Full award rows from `search/spending_by_award/`
    AwardSearch,
    /// Transaction rows from `search/spending_by_transaction/`
    TransactionSearch,
    /// Five-field award rows for aggregation
    Competition,
}

impl Projection {
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Projection::AwardSearch => AWARD_FIELDS,
            Projection::TransactionSearch => TRANSACTION_FIELDS,
            Projection::Competition => COMPETITION_FIELDS,
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Projection::AwardSearch | Projection::Competition => "search/spending_by_award/",
            Projection::TransactionSearch => "search/spending_by_transaction/",
        }
    }

    /// The amount column in this family's vocabulary.
    pub fn amount_field(self) -> &'static str {
        match self {
            Projection::AwardSearch | Projection::Competition => "Award Amount",
            Projection::TransactionSearch => "Transaction Amount",
        }
    }

    pub fn parse(self, raw: Value) -> RawRecord {
        match self {
            Projection::AwardSearch | Projection::Competition => RawRecord::award(raw),
            Projection::TransactionSearch => RawRecord::transaction(raw),
        }
    }

    pub fn normalize(self, raw: Value) -> NormalizedResult {
        self.parse(raw).normalize()
    }

    pub fn normalize_all(self, rows: Vec<Value>) -> Vec<NormalizedResult> {
        rows.into_iter().map(|row| self.normalize(row)).collect()
    }
}

/// Pagination block of a search response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageMetadata {
    #[serde(default, deserialize_with = "lenient::amount")]
    pub page: Option<f64>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub total: Option<f64>,
    #[serde(rename = "hasNext", alias = "has_next_page", default)]
    pub has_next: Option<bool>,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub limit: Option<f64>,
}

/// Envelope shared by the paginated search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::nested")]
    pub page_metadata: Option<PageMetadata>,
}

impl SearchPage {
    /// Decode a response body; a body without `results` is an empty page.
    pub fn from_value(value: Value) -> Self {
        lenient::record(value)
    }

    /// Upstream total when reported, else the size of this page.
    pub fn total(&self) -> u64 {
        self.page_metadata
            .as_ref()
            .and_then(|m| m.total)
            .map(|t| t.max(0.0) as u64)
            .unwrap_or(self.results.len() as u64)
    }

    pub fn has_next(&self) -> bool {
        self.page_metadata
            .as_ref()
            .and_then(|m| m.has_next)
            .unwrap_or(false)
    }
}

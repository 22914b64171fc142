//! Filter compilation.
//!
//! [`FilterCompiler`] turns the flat [`SearchCriteria`] a tool receives into
//! the nested `filters` object the USAspending search endpoints expect. Each
//! source field feeds at most one compiled key through its own rule, and a
//! missing or empty source leaves its key out entirely. The one exception is
//! `award_type_codes`, which always defaults to the four contract types.
//!
//! Compilation is pure: the only clock input is the `today` the compiler was
//! built with, so compiling the same criteria twice yields identical output.

use crate::date::{self, DateRange, DateWarning};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Definitive contract (A), purchase order (B), delivery order (C), BPA call (D).
pub const CONTRACT_AWARD_TYPES: &[&str] = &["A", "B", "C", "D"];

/// The caller-facing search parameters shared by the search tools.
///
/// Date precedence when several are supplied: `fiscal_year`, then
/// `date_range`, then `start_date`/`end_date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub keywords: Vec<String>,
    pub recipient_name: Option<String>,
    pub agency_name: Option<String>,
    pub naics_codes: Vec<String>,
    pub psc_codes: Vec<String>,
    /// ISO date or natural phrase
    pub start_date: Option<String>,
    /// ISO date or natural phrase
    pub end_date: Option<String>,
    /// Natural range phrase such as "last 6 months"
    pub date_range: Option<String>,
    pub fiscal_year: Option<i32>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    /// Two-letter place-of-performance state code
    pub state: Option<String>,
    pub award_type_codes: Vec<String>,
    pub set_aside_type_codes: Vec<String>,
    pub extent_competed_type_codes: Vec<String>,
    pub contract_pricing_type_codes: Vec<String>,
    pub limit: Option<u32>,
}

/// The `filters` object sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<Vec<DateRange>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_search_text: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agencies: Option<Vec<AgencyFilter>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub naics_codes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub psc_codes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub award_amounts: Option<Vec<AmountBounds>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_performance_locations: Option<Vec<LocationFilter>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_aside_type_codes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent_competed_type_codes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_pricing_type_codes: Option<Vec<String>>,

    pub award_type_codes: Vec<String>,
}

/// Agency scope. Always awarding/toptier: there is no way to filter by
/// funding agency or by subtier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgencyFilter {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub tier: &'static str,
    pub name: String,
}

impl AgencyFilter {
    pub fn awarding_toptier(name: impl Into<String>) -> Self {
        Self {
            kind: "awarding",
            tier: "toptier",
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmountBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationFilter {
    pub country: &'static str,
    pub state: String,
}

/// Compiled filters plus any date fallbacks taken along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub filters: CompiledFilter,
    pub warnings: Vec<DateWarning>,
}

impl Compiled {
    /// The window the filters cover, if any.
    pub fn time_period(&self) -> Option<DateRange> {
        self.filters
            .time_period
            .as_ref()
            .and_then(|periods| periods.first().copied())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler {
    today: NaiveDate,
}

impl FilterCompiler {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Compile search criteria. With no date input at all, no `time_period` is
    /// emitted and the search covers all history.
    pub fn compile(&self, criteria: &SearchCriteria) -> Compiled {
        let mut warnings = Vec::new();
        let period = self.resolve_time_period(criteria, &mut warnings);
        Compiled {
            filters: self.build(criteria, period),
            warnings,
        }
    }

    /// Compile search criteria whose date window is mandatory: with no date
    /// input the trailing year ending today is used.
    pub fn compile_windowed(&self, criteria: &SearchCriteria) -> Compiled {
        let mut warnings = Vec::new();
        let period = self
            .resolve_time_period(criteria, &mut warnings)
            .unwrap_or_else(|| DateRange::trailing_year(self.today));
        Compiled {
            filters: self.build(criteria, Some(period)),
            warnings,
        }
    }

    fn build(&self, criteria: &SearchCriteria, period: Option<DateRange>) -> CompiledFilter {
        CompiledFilter {
            keywords: non_empty_list(&criteria.keywords),
            time_period: period.map(|p| vec![p]),
            recipient_search_text: non_empty(&criteria.recipient_name).map(|name| vec![name]),
            agencies: non_empty(&criteria.agency_name)
                .map(|name| vec![AgencyFilter::awarding_toptier(name)]),
            naics_codes: non_empty_list(&criteria.naics_codes),
            psc_codes: non_empty_list(&criteria.psc_codes),
            award_amounts: amount_bounds(criteria.min_amount, criteria.max_amount).map(|b| vec![b]),
            place_of_performance_locations: non_empty(&criteria.state).map(|state| {
                vec![LocationFilter {
                    country: "USA",
                    state: state.to_uppercase(),
                }]
            }),
            set_aside_type_codes: non_empty_list(&criteria.set_aside_type_codes),
            extent_competed_type_codes: non_empty_list(&criteria.extent_competed_type_codes),
            contract_pricing_type_codes: non_empty_list(&criteria.contract_pricing_type_codes),
            award_type_codes: non_empty_list(&criteria.award_type_codes).unwrap_or_else(|| {
                CONTRACT_AWARD_TYPES.iter().map(|c| c.to_string()).collect()
            }),
        }
    }

    /// Fiscal year, then named range, then explicit bounds. A single explicit
    /// bound gets its partner synthesized: one year back for a missing start,
    /// today for a missing end.
    fn resolve_time_period(
        &self,
        criteria: &SearchCriteria,
        warnings: &mut Vec<DateWarning>,
    ) -> Option<DateRange> {
        if let Some(year) = criteria.fiscal_year {
            match date::fiscal_year_range(year) {
                Some(range) => return Some(range),
                None => warnings.push(DateWarning::with_message(
                    &year.to_string(),
                    "the next date parameter",
                    format!("Fiscal year {year} is out of range and was ignored"),
                )),
            }
        }

        if let Some(phrase) = non_empty(&criteria.date_range) {
            let resolved = date::parse_date_range(&phrase, self.today);
            warnings.extend(resolved.warning);
            return Some(resolved.value);
        }

        let start = non_empty(&criteria.start_date);
        let end = non_empty(&criteria.end_date);
        if start.is_none() && end.is_none() {
            return None;
        }

        let start_date = match start {
            Some(expr) => {
                let resolved = date::parse_natural_date(&expr, self.today);
                warnings.extend(resolved.warning);
                resolved.value
            }
            None => date::one_year_before(self.today),
        };
        let end_date = match end {
            Some(expr) => {
                let resolved = date::parse_natural_date(&expr, self.today);
                warnings.extend(resolved.warning);
                resolved.value
            }
            None => self.today,
        };
        Some(DateRange::new(start_date, end_date))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn non_empty_list(values: &[String]) -> Option<Vec<String>> {
    let cleaned: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn amount_bounds(min: Option<f64>, max: Option<f64>) -> Option<AmountBounds> {
    if min.is_none() && max.is_none() {
        return None;
    }
    Some(AmountBounds {
        lower_bound: min,
        upper_bound: max,
    })
}

//! Query translation for the USAspending v2 API.
//!
//! - [`date`] resolves natural date expressions and fiscal years
//! - [`filter`] compiles flat search parameters into upstream `filters`
//! - [`projection`] declares requested fields and normalizes result rows
//!
//! Everything in this crate is pure; network I/O lives in `spendlens-client`.

pub mod date;
pub mod filter;
pub mod projection;

pub use date::{
    Clock, DateRange, DateWarning, Resolved, fiscal_year_range, parse_date_range,
    parse_natural_date,
};
pub use filter::{CONTRACT_AWARD_TYPES, Compiled, CompiledFilter, FilterCompiler, SearchCriteria};
pub use projection::{NormalizedResult, Projection, SearchPage};

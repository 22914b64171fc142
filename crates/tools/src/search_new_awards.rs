//! `search_new_awards`: base awards only, most recent first.
//!
//! Only transaction rows carry an action date and a modification number, so
//! this searches transactions and keeps the base (unmodified) ones. Upstream
//! has no such predicate; the filtering happens here over one fetched page.

use crate::common::{self, MAX_LIMIT, Payload, ToolContext, filter_properties, limit_property, parse_args};
use async_trait::async_trait;
use serde_json::{Value, json};
use spendlens_core::error::ToolError;
use spendlens_core::tool::{Tool, ToolResult};
use spendlens_query::projection::new_awards_only;
use spendlens_query::{Projection, SearchCriteria, SearchPage};
use std::sync::Arc;
use tracing::{debug, info};

pub struct SearchNewAwardsTool {
    ctx: Arc<ToolContext>,
}

impl SearchNewAwardsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SearchNewAwardsTool {
    fn name(&self) -> &str {
        "search_new_awards"
    }

    fn description(&self) -> &str {
        "Find newly signed contract awards (base awards, not modifications) using \
         transaction action dates. Accepts the same filters as search_awards and \
         returns the most recent base awards first."
    }

    fn parameters_schema(&self) -> Value {
        let mut props = filter_properties();
        props.insert(
            "limit".into(),
            limit_property(self.ctx.config.default_limit, "Number of new awards to return"),
        );
        common::object_schema(props, &[])
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let criteria: SearchCriteria = parse_args(arguments)?;
        let limit = self.ctx.limit(criteria.limit, self.ctx.config.default_limit) as usize;
        let compiled = self.ctx.compiler().compile(&criteria);
        let projection = Projection::TransactionSearch;

        // Fetch a full page: modifications are dropped after the fact.
        let body = json!({
            "filters": compiled.filters,
            "fields": projection.fields(),
            "limit": MAX_LIMIT,
            "page": 1,
            "sort": "Action Date",
            "order": "desc"
        });

        info!(limit, "Searching new awards");
        let response = self.ctx.client.post(projection.endpoint(), body).await?;
        let page = SearchPage::from_value(response);
        let scanned = page.results.len();

        let mut results = new_awards_only(projection.normalize_all(page.results));
        let base_awards = results.len();
        results.truncate(limit);
        debug!(scanned, base_awards, returned = results.len(), "Filtered to base awards");

        let summary = if results.is_empty() {
            format!("No new awards found among {scanned} transactions scanned.")
        } else {
            format!(
                "Found {base_awards} new awards among {scanned} transactions scanned; \
                 showing the {} most recent.",
                results.len()
            )
        };

        Ok(Payload::new(summary)
            .with("count", results.len())
            .with("transactions_scanned", scanned)
            .with("time_period", compiled.time_period())
            .with("results", results)
            .with_warnings(&compiled.warnings)
            .into_result())
    }
}

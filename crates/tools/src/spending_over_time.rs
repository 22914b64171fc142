//! `get_spending_over_time`: obligations bucketed by fiscal period.

use crate::common::{self, Payload, ToolContext, filter_properties, format_amount, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use spendlens_core::error::ToolError;
use spendlens_core::tool::{Tool, ToolResult};
use spendlens_query::projection::{SpendingGroup, SpendingPeriod};
use spendlens_query::{SearchCriteria, SearchPage};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Args {
    group: SpendingGroup,
    #[serde(flatten)]
    filters: SearchCriteria,
}

pub struct SpendingOverTimeTool {
    ctx: Arc<ToolContext>,
}

impl SpendingOverTimeTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SpendingOverTimeTool {
    fn name(&self) -> &str {
        "get_spending_over_time"
    }

    fn description(&self) -> &str {
        "Show how contract spending matching the given filters is distributed over \
         time, grouped by fiscal year, quarter or month."
    }

    fn parameters_schema(&self) -> Value {
        let mut props = filter_properties();
        props.insert(
            "group".into(),
            json!({
                "type": "string",
                "enum": ["fiscal_year", "quarter", "month"],
                "default": "fiscal_year",
                "description": "Time bucket size"
            }),
        );
        common::object_schema(props, &[])
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_args(arguments)?;
        let compiled = self.ctx.compiler().compile(&args.filters);
        let group = args.group;

        info!(group = group.as_str(), "Fetching spending over time");
        let response = self
            .ctx
            .client
            .post(
                "search/spending_over_time/",
                json!({
                    "group": group.as_str(),
                    "filters": compiled.filters,
                    "subawards": false
                }),
            )
            .await?;

        let periods: Vec<SpendingPeriod> = SearchPage::from_value(response)
            .results
            .into_iter()
            .map(SpendingPeriod::from_raw)
            .collect();
        let total: f64 = periods.iter().map(|p| p.amount).sum();

        let summary = if periods.is_empty() {
            "No spending matched the given filters.".to_string()
        } else {
            format!(
                "{} total across {} {} periods.",
                format_amount(total),
                periods.len(),
                group.as_str().replace('_', " ")
            )
        };

        Ok(Payload::new(summary)
            .with("group", group)
            .with("total_amount", total)
            .with("time_period", compiled.time_period())
            .with("results", periods)
            .with_warnings(&compiled.warnings)
            .into_result())
    }
}

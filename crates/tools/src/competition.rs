//! `analyze_competition`: who wins the money in a market.
//!
//! Fetches one page of awards through the competition projection, groups it
//! by recipient, and ranks the recipients by total obligated amount. Market
//! share is computed against the sum of the returned top-N totals, so the
//! shares of the returned entries always add up to 100%.

use crate::common::{
    self, MAX_LIMIT, Payload, ToolContext, filter_properties, format_amount, limit_property,
    parse_args,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use spendlens_core::error::ToolError;
use spendlens_core::tool::{Tool, ToolResult};
use spendlens_query::{NormalizedResult, Projection, SearchCriteria, SearchPage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

const UNKNOWN_RECIPIENT: &str = "Unknown Recipient";

/// Per-recipient totals over one fetched page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientAggregate {
    pub recipient_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub total_amount: f64,
    pub award_count: usize,
    pub award_ids: Vec<String>,
}

/// A ranked aggregate with its share of the returned total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketShare {
    pub rank: usize,
    #[serde(flatten)]
    pub aggregate: RecipientAggregate,
    pub market_share_pct: f64,
}

/// Group awards by recipient name, largest total first.
///
/// Missing names fall into a single "Unknown Recipient" bucket and missing
/// amounts count as zero. Ties keep first-seen order.
pub fn aggregate_by_recipient(awards: &[NormalizedResult]) -> Vec<RecipientAggregate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut aggregates: Vec<RecipientAggregate> = Vec::new();

    for award in awards {
        let name = award
            .recipient_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_RECIPIENT);

        let slot = *index.entry(name.to_string()).or_insert_with(|| {
            aggregates.push(RecipientAggregate {
                recipient_name: name.to_string(),
                recipient_id: None,
                total_amount: 0.0,
                award_count: 0,
                award_ids: Vec::new(),
            });
            aggregates.len() - 1
        });

        let entry = &mut aggregates[slot];
        entry.total_amount += award.amount.unwrap_or(0.0);
        entry.award_count += 1;
        if entry.recipient_id.is_none() {
            entry.recipient_id = award.recipient_id.clone();
        }
        if let Some(id) = &award.id {
            entry.award_ids.push(id.clone());
        }
    }

    aggregates.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
    aggregates
}

/// Keep the top `limit` aggregates and compute each one's share of their
/// combined total, rounded to two decimals. A zero combined total gives
/// every entry a zero share.
pub fn market_shares(mut aggregates: Vec<RecipientAggregate>, limit: usize) -> Vec<MarketShare> {
    aggregates.truncate(limit);
    let denominator: f64 = aggregates.iter().map(|a| a.total_amount).sum();

    aggregates
        .into_iter()
        .enumerate()
        .map(|(i, aggregate)| {
            let share = if denominator > 0.0 {
                aggregate.total_amount / denominator * 100.0
            } else {
                0.0
            };
            MarketShare {
                rank: i + 1,
                aggregate,
                market_share_pct: (share * 100.0).round() / 100.0,
            }
        })
        .collect()
}

pub struct CompetitionTool {
    ctx: Arc<ToolContext>,
}

impl CompetitionTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CompetitionTool {
    fn name(&self) -> &str {
        "analyze_competition"
    }

    fn description(&self) -> &str {
        "Analyze the competitive landscape for a market: ranks recipients by total \
         award amount with award counts and market share. Accepts the search_awards \
         filters; without any date parameter the trailing year is analyzed. Shares \
         are relative to the returned top recipients."
    }

    fn parameters_schema(&self) -> Value {
        let mut props = filter_properties();
        props.insert(
            "limit".into(),
            limit_property(
                self.ctx.config.competition_limit,
                "Number of top recipients to return",
            ),
        );
        common::object_schema(props, &[])
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let criteria: SearchCriteria = parse_args(arguments)?;
        let limit = self.ctx.limit(criteria.limit, self.ctx.config.competition_limit) as usize;
        let compiled = self.ctx.compiler().compile_windowed(&criteria);
        let projection = Projection::Competition;

        let body = json!({
            "filters": compiled.filters,
            "fields": projection.fields(),
            "limit": MAX_LIMIT,
            "page": 1,
            "sort": projection.amount_field(),
            "order": "desc",
            "subawards": false
        });

        info!(limit, "Analyzing competition");
        let response = self.ctx.client.post(projection.endpoint(), body).await?;
        let awards = projection.normalize_all(SearchPage::from_value(response).results);

        let aggregates = aggregate_by_recipient(&awards);
        let unique_recipients = aggregates.len();
        let ranked = market_shares(aggregates, limit);
        let top_total: f64 = ranked.iter().map(|r| r.aggregate.total_amount).sum();
        debug!(
            awards = awards.len(),
            unique_recipients,
            returned = ranked.len(),
            "Aggregated awards by recipient"
        );

        let period = compiled
            .time_period()
            .map(|p| format!(" ({p})"))
            .unwrap_or_default();
        let summary = if awards.is_empty() {
            format!("No awards found to analyze{period}.")
        } else {
            format!(
                "Analyzed {} awards across {unique_recipients} recipients{period}; \
                 the top {} account for {}.",
                awards.len(),
                ranked.len(),
                format_amount(top_total)
            )
        };

        Ok(Payload::new(summary)
            .with("total_awards_analyzed", awards.len())
            .with("unique_recipients", unique_recipients)
            .with("time_period", compiled.time_period())
            .with("top_recipients_total", top_total)
            .with("top_recipients", ranked)
            .with_warnings(&compiled.warnings)
            .into_result())
    }
}

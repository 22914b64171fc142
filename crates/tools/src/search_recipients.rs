//! `search_recipients`: recipient name autocomplete.

use crate::common::{self, Payload, ToolContext, limit_property, parse_args, require_id};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use spendlens_core::error::ToolError;
use spendlens_core::tool::{Tool, ToolResult};
use spendlens_query::SearchPage;
use spendlens_query::projection::RecipientMatch;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Args {
    search_text: String,
    #[serde(default)]
    limit: Option<u32>,
}

pub struct SearchRecipientsTool {
    ctx: Arc<ToolContext>,
}

impl SearchRecipientsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SearchRecipientsTool {
    fn name(&self) -> &str {
        "search_recipients"
    }

    fn description(&self) -> &str {
        "Look up federal award recipients (companies, universities, governments) by \
         name. Returns recipient ids usable with get_recipient_details, plus UEI \
         and parent/child level."
    }

    fn parameters_schema(&self) -> Value {
        let mut props = Map::new();
        props.insert(
            "search_text".into(),
            json!({
                "type": "string",
                "description": "Full or partial recipient name"
            }),
        );
        props.insert(
            "limit".into(),
            limit_property(self.ctx.config.default_limit, "Number of matches to return"),
        );
        common::object_schema(props, &["search_text"])
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_args(arguments)?;
        let search_text = require_id(&args.search_text, "search_text")?;
        let limit = self.ctx.limit(args.limit, self.ctx.config.default_limit);

        info!(search_text = %search_text, limit, "Searching recipients");
        let response = self
            .ctx
            .client
            .post(
                "autocomplete/recipient/",
                json!({"search_text": search_text, "limit": limit}),
            )
            .await?;

        let results: Vec<RecipientMatch> = SearchPage::from_value(response)
            .results
            .into_iter()
            .map(RecipientMatch::from_raw)
            .collect();

        let summary = if results.is_empty() {
            format!("No recipients found matching '{search_text}'.")
        } else {
            format!(
                "Found {} recipients matching '{search_text}'.",
                results.len()
            )
        };

        Ok(Payload::new(summary)
            .with("total", results.len())
            .with("results", results)
            .into_result())
    }
}

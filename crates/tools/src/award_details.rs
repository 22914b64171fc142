//! `get_award_details`: one award by its generated unique id.

use crate::common::{self, Payload, ToolContext, format_amount, parse_args, path_segment, require_id};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use spendlens_core::error::ToolError;
use spendlens_core::tool::{Tool, ToolResult};
use spendlens_query::projection::RawRecord;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Args {
    award_id: String,
}

pub struct AwardDetailsTool {
    ctx: Arc<ToolContext>,
}

impl AwardDetailsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for AwardDetailsTool {
    fn name(&self) -> &str {
        "get_award_details"
    }

    fn description(&self) -> &str {
        "Get full details for a single award by its generated unique award id \
         (e.g. 'CONT_AWD_...'), including recipient, agencies, signing date, \
         period of performance and classification codes."
    }

    fn parameters_schema(&self) -> Value {
        let mut props = Map::new();
        props.insert(
            "award_id".into(),
            json!({
                "type": "string",
                "description": "Generated unique award id as returned in 'internalId' by the search tools"
            }),
        );
        common::object_schema(props, &["award_id"])
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_args(arguments)?;
        let award_id = require_id(&args.award_id, "award_id")?;

        info!(award_id = %award_id, "Fetching award details");
        let endpoint = format!("awards/{}/", path_segment(&award_id));
        let response = match self.ctx.client.get(&endpoint).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                return Ok(Payload::new(format!("No award found with id '{award_id}'."))
                    .with("found", false)
                    .with("award_id", &award_id)
                    .into_result());
            }
            Err(e) => return Err(e.into()),
        };

        let award = RawRecord::award_detail(response).normalize();
        let summary = format!(
            "Award {}: {} to {}{}.",
            award.id.as_deref().unwrap_or(&award_id),
            award.amount.map(format_amount).unwrap_or_else(|| "unknown amount".into()),
            award.recipient_name.as_deref().unwrap_or("an unnamed recipient"),
            award
                .signed_date
                .as_deref()
                .map(|d| format!(", signed {d}"))
                .unwrap_or_default()
        );

        Ok(Payload::new(summary)
            .with("found", true)
            .with("award", award)
            .into_result())
    }
}

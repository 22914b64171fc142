//! `get_recipient_details`: one recipient profile by recipient id.

use crate::common::{self, Payload, ToolContext, format_amount, parse_args, path_segment, require_id};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use spendlens_core::error::ToolError;
use spendlens_core::tool::{Tool, ToolResult};
use spendlens_query::projection::RecipientProfile;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Args {
    recipient_id: String,
}

pub struct RecipientDetailsTool {
    ctx: Arc<ToolContext>,
}

impl RecipientDetailsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for RecipientDetailsTool {
    fn name(&self) -> &str {
        "get_recipient_details"
    }

    fn description(&self) -> &str {
        "Get the profile of a federal award recipient by recipient id (the hash \
         returned by search_recipients): identifiers, parent organization, location, \
         business types and total transaction amount."
    }

    fn parameters_schema(&self) -> Value {
        let mut props = Map::new();
        props.insert(
            "recipient_id".into(),
            json!({
                "type": "string",
                "description": "Recipient id such as '1c3edaaa-611b-840c-bf2b-fd34df49f21f-P'"
            }),
        );
        common::object_schema(props, &["recipient_id"])
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_args(arguments)?;
        let recipient_id = require_id(&args.recipient_id, "recipient_id")?;

        info!(recipient_id = %recipient_id, "Fetching recipient profile");
        let endpoint = format!("recipient/{}/", path_segment(&recipient_id));
        let response = match self.ctx.client.get(&endpoint).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                return Ok(
                    Payload::new(format!("No recipient found with id '{recipient_id}'."))
                        .with("found", false)
                        .with("recipient_id", &recipient_id)
                        .into_result(),
                );
            }
            Err(e) => return Err(e.into()),
        };

        let profile = RecipientProfile::from_raw(response);
        let name = profile.name.as_deref().unwrap_or("Unnamed recipient");
        let summary = match profile.total_transaction_amount {
            Some(total) => format!("{name}: {} in federal transactions.", format_amount(total)),
            None => format!("{name}: recipient profile."),
        };

        Ok(Payload::new(summary)
            .with("found", true)
            .with("recipient", profile)
            .into_result())
    }
}

//! `search_idv_awards`: child orders issued under an IDV.

use crate::common::{self, Payload, ToolContext, limit_property, parse_args, require_id};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use spendlens_core::error::ToolError;
use spendlens_core::tool::{Tool, ToolResult};
use spendlens_query::SearchPage;
use spendlens_query::projection::RawRecord;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct Args {
    award_id: String,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    page: Option<u32>,
}

pub struct IdvAwardsTool {
    ctx: Arc<ToolContext>,
}

impl IdvAwardsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for IdvAwardsTool {
    fn name(&self) -> &str {
        "search_idv_awards"
    }

    fn description(&self) -> &str {
        "List task and delivery orders issued under an Indefinite Delivery Vehicle \
         (IDV), given the IDV's generated unique award id."
    }

    fn parameters_schema(&self) -> Value {
        let mut props = Map::new();
        props.insert(
            "award_id".into(),
            json!({
                "type": "string",
                "description": "Generated unique award id of the parent IDV (e.g. 'CONT_IDV_...')"
            }),
        );
        props.insert(
            "limit".into(),
            limit_property(self.ctx.config.default_limit, "Number of child orders to return"),
        );
        props.insert(
            "page".into(),
            json!({
                "type": "integer",
                "minimum": 1,
                "default": 1,
                "description": "Result page"
            }),
        );
        common::object_schema(props, &["award_id"])
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: Args = parse_args(arguments)?;
        let award_id = require_id(&args.award_id, "award_id")?;
        let limit = self.ctx.limit(args.limit, self.ctx.config.default_limit);
        let page = args.page.unwrap_or(1).max(1);

        info!(award_id = %award_id, limit, page, "Listing IDV child awards");
        let response = self
            .ctx
            .client
            .post(
                "idvs/activity/",
                json!({"award_id": award_id, "limit": limit, "page": page}),
            )
            .await?;

        let results: Vec<_> = SearchPage::from_value(response)
            .results
            .into_iter()
            .map(|row| RawRecord::idv_child(row).normalize())
            .collect();

        let summary = if results.is_empty() {
            format!("No child awards found under IDV {award_id}.")
        } else {
            format!("Found {} child awards under IDV {award_id}.", results.len())
        };

        Ok(Payload::new(summary)
            .with("count", results.len())
            .with("page", page)
            .with("results", results)
            .into_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::{context, sent_body};
    use spendlens_client::mock::ScriptedTransport;

    #[tokio::test]
    async fn lists_children() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            200,
            json!({
                "results": [{
                    "piid": "TO-0001",
                    "generated_unique_award_id": "CONT_AWD_TO-0001",
                    "parent_award_piid": "IDV-9",
                    "recipient_name": "ACME CORP",
                    "obligated_amount": 42000.0,
                    "period_of_performance_start_date": "2023-05-01"
                }],
                "page_metadata": {"page": 1, "hasNext": false}
            }),
        ));
        let tool = IdvAwardsTool::new(context(&transport));

        let result = tool
            .execute(json!({"award_id": "CONT_IDV_IDV-9"}))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["count"], 1);
        assert!(data.get("total").is_none());
        assert_eq!(data["results"][0]["id"], "TO-0001");
        assert_eq!(data["results"][0]["parentAwardId"], "IDV-9");
        assert_eq!(data["results"][0]["amount"], 42000.0);

        assert_eq!(
            sent_body(&transport, 0),
            json!({"award_id": "CONT_IDV_IDV-9", "limit": 10, "page": 1})
        );
    }

    #[tokio::test]
    async fn empty_vehicle() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, json!({"results": []})));
        let tool = IdvAwardsTool::new(context(&transport));

        let result = tool
            .execute(json!({"award_id": "CONT_IDV_X", "page": 0}))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["count"], 0);
        assert_eq!(data["page"], 1);
    }
}

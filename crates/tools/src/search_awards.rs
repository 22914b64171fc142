//! `search_awards`: filtered award search, largest first.

use crate::common::{self, Payload, ToolContext, filter_properties, limit_property, parse_args};
use async_trait::async_trait;
use serde_json::{Value, json};
use spendlens_core::error::ToolError;
use spendlens_core::tool::{Tool, ToolResult};
use spendlens_query::{Projection, SearchCriteria, SearchPage};
use std::sync::Arc;
use tracing::info;

pub struct SearchAwardsTool {
    ctx: Arc<ToolContext>,
}

impl SearchAwardsTool {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for SearchAwardsTool {
    fn name(&self) -> &str {
        "search_awards"
    }

    fn description(&self) -> &str {
        "Search federal contract awards by keyword, recipient, agency, industry code, \
         date range, amount and location. Returns the largest matching awards first \
         along with the total number of matches. Omitting every date parameter \
         searches all history."
    }

    fn parameters_schema(&self) -> Value {
        let mut props = filter_properties();
        props.insert(
            "limit".into(),
            limit_property(
                self.ctx.config.default_limit,
                "Number of awards to return",
            ),
        );
        common::object_schema(props, &[])
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let criteria: SearchCriteria = parse_args(arguments)?;
        let limit = self.ctx.limit(criteria.limit, self.ctx.config.default_limit);
        let compiled = self.ctx.compiler().compile(&criteria);
        let projection = Projection::AwardSearch;

        let body = json!({
            "filters": compiled.filters,
            "fields": projection.fields(),
            "limit": limit,
            "page": 1,
            "sort": projection.amount_field(),
            "order": "desc",
            "subawards": false
        });

        info!(limit, "Searching awards");
        let response = self.ctx.client.post(projection.endpoint(), body).await?;
        let page = SearchPage::from_value(response);
        let total = page.total();
        let has_next = page.has_next();
        let results = projection.normalize_all(page.results);

        let summary = match (results.len(), compiled.time_period()) {
            (0, _) => "No awards matched the given filters.".to_string(),
            (n, Some(period)) => {
                format!("Found {total} matching awards ({period}); showing the top {n} by amount.")
            }
            (n, None) => format!("Found {total} matching awards; showing the top {n} by amount."),
        };

        Ok(Payload::new(summary)
            .with("total", total)
            .with("count", results.len())
            .with("has_next", has_next)
            .with("time_period", compiled.time_period())
            .with("results", results)
            .with_warnings(&compiled.warnings)
            .into_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::{context, sent_body};
    use spendlens_client::mock::ScriptedTransport;

    fn page() -> Value {
        json!({
            "results": [
                {
                    "Award ID": "W91",
                    "generated_internal_id": "CONT_AWD_W91",
                    "Recipient Name": "ACME CORP",
                    "Award Amount": 5000000.0,
                    "Start Date": "2023-01-01",
                    "NAICS": {"code": "541512", "description": "COMPUTER SYSTEMS DESIGN"}
                },
                {
                    "Award ID": "W92",
                    "Recipient Name": "BETA LLC",
                    "Award Amount": 100.0
                }
            ],
            "page_metadata": {"page": 1, "total": 412, "hasNext": true}
        })
    }

    #[tokio::test]
    async fn returns_normalized_results_and_upstream_total() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, page()));
        let tool = SearchAwardsTool::new(context(&transport));

        let result = tool
            .execute(json!({"keywords": ["cloud"], "limit": 2}))
            .await
            .unwrap();
        assert!(result.success);

        let data = result.data.unwrap();
        assert_eq!(data["total"], 412);
        assert_eq!(data["count"], 2);
        assert_eq!(data["has_next"], true);
        assert_eq!(data["results"][0]["id"], "W91");
        assert_eq!(data["results"][0]["internalId"], "CONT_AWD_W91");
        assert_eq!(data["results"][0]["naics"]["code"], "541512");
        assert_eq!(data["results"][0]["performanceStartDate"], "2023-01-01");
        assert!(data["results"][0].get("signedDate").is_none());
        assert!(data["summary"].as_str().unwrap().contains("412"));
    }

    #[tokio::test]
    async fn sends_award_projection_sorted_by_amount() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, page()));
        let tool = SearchAwardsTool::new(context(&transport));

        tool.execute(json!({"agency_name": "Department of Defense"}))
            .await
            .unwrap();

        let requests = transport.requests();
        assert!(
            requests[0]
                .request
                .url
                .ends_with("/search/spending_by_award/")
        );
        let body = sent_body(&transport, 0);
        assert_eq!(body["limit"], 10);
        assert_eq!(body["sort"], "Award Amount");
        assert_eq!(body["order"], "desc");
        assert_eq!(body["fields"][0], "Award ID");
        assert_eq!(body["filters"]["agencies"][0]["tier"], "toptier");
        assert_eq!(body["filters"]["award_type_codes"], json!(["A", "B", "C", "D"]));
        assert!(body["filters"].get("time_period").is_none());
    }

    #[tokio::test]
    async fn limit_is_capped() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, page()));
        let tool = SearchAwardsTool::new(context(&transport));

        tool.execute(json!({"limit": 5000})).await.unwrap();
        assert_eq!(sent_body(&transport, 0)["limit"], 100);
    }

    #[tokio::test]
    async fn date_fallback_is_reported() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, json!({"results": []})));
        let tool = SearchAwardsTool::new(context(&transport));

        let result = tool
            .execute(json!({"date_range": "sometime around spring"}))
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["total"], 0);
        assert_eq!(data["warnings"][0]["input"], "sometime around spring");
        assert_eq!(data["time_period"]["start_date"], "2024-02-14");
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error() {
        let transport =
            Arc::new(ScriptedTransport::new().respond(400, json!({"detail": "bad filter"})));
        let tool = SearchAwardsTool::new(context(&transport));

        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(err.to_string().contains("bad filter"));
    }

    #[test]
    fn schema_documents_limit_bounds() {
        let transport = Arc::new(ScriptedTransport::new());
        let tool = SearchAwardsTool::new(context(&transport));
        let schema = tool.parameters_schema();
        assert_eq!(schema["properties"]["limit"]["maximum"], 100);
        assert_eq!(schema["properties"]["limit"]["default"], 10);
    }
}

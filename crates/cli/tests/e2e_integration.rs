//! End-to-end integration tests for the spendlens research tools.
//!
//! These tests drive the full pipeline: registry, tool handler, date
//! resolution, filter compilation, projection, fetch client, and a scripted
//! transport standing in for the USAspending API.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{Value, json};
use spendlens_client::mock::ScriptedTransport;
use spendlens_client::{Method, SpendingClient};
use spendlens_config::{ApiConfig, ToolsConfig};
use spendlens_core::tool::{ToolCall, ToolRegistry, ToolResult};
use spendlens_query::Clock;
use spendlens_tools::{ToolContext, default_registry};

// ── Harness ──────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn registry_with(transport: &Arc<ScriptedTransport>, request_delay_ms: u64) -> ToolRegistry {
    let api = ApiConfig {
        base_url: "https://api.test/api/v2".into(),
        request_delay_ms,
        ..ApiConfig::default()
    };
    let client = SpendingClient::with_transport(&api, transport.clone());
    let ctx = ToolContext::new(Arc::new(client), Clock::Fixed(today()), ToolsConfig::default());
    default_registry(Arc::new(ctx))
}

fn registry(transport: &Arc<ScriptedTransport>) -> ToolRegistry {
    registry_with(transport, 0)
}

async fn call(registry: &ToolRegistry, name: &str, arguments: Value) -> ToolResult {
    registry
        .invoke(&ToolCall {
            id: format!("call_{name}"),
            name: name.into(),
            arguments,
        })
        .await
}

fn payload(result: &ToolResult) -> Value {
    assert!(result.success, "tool failed: {}", result.output);
    serde_json::from_str(&result.output).expect("success output is JSON")
}

fn body(transport: &ScriptedTransport, n: usize) -> Value {
    transport.requests()[n].request.body.clone().unwrap_or(Value::Null)
}

// ── Search ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_awards_full_pipeline() {
    let transport = Arc::new(ScriptedTransport::new().respond(
        200,
        json!({
            "results": [{
                "Award ID": "FA8750-24-C-0001",
                "generated_internal_id": "CONT_AWD_FA8750",
                "Recipient Name": "RAYTHEON COMPANY",
                "recipient_id": "ray-P",
                "Award Amount": "12,500,000.00",
                "Description": "RADAR SUSTAINMENT",
                "Start Date": "2024-03-01",
                "End Date": "2029-02-28",
                "Awarding Agency": "Department of Defense",
                "Place of Performance State Code": "MA"
            }],
            "page_metadata": {"page": 1, "total": 1, "hasNext": false}
        }),
    ));
    let registry = registry(&transport);

    let result = call(
        &registry,
        "search_awards",
        json!({
            "keywords": ["radar"],
            "agency_name": "Department of Defense",
            "date_range": "last 30 days",
            "min_amount": 1000000,
            "state": "ma",
            "limit": 5
        }),
    )
    .await;
    let data = payload(&result);

    assert_eq!(result.call_id, "call_search_awards");
    assert_eq!(data["total"], 1);
    let award = &data["results"][0];
    assert_eq!(award["id"], "FA8750-24-C-0001");
    assert_eq!(award["amount"], 12500000.0);
    assert_eq!(award["performanceStartDate"], "2024-03-01");
    assert!(award.get("signedDate").is_none());

    let request = &transport.requests()[0].request;
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, "https://api.test/api/v2/search/spending_by_award/");

    let filters = &body(&transport, 0)["filters"];
    assert_eq!(
        filters,
        &json!({
            "keywords": ["radar"],
            "time_period": [{"start_date": "2024-02-14", "end_date": "2024-03-15"}],
            "agencies": [{"type": "awarding", "tier": "toptier", "name": "Department of Defense"}],
            "award_amounts": [{"lower_bound": 1000000.0}],
            "place_of_performance_locations": [{"country": "USA", "state": "MA"}],
            "award_type_codes": ["A", "B", "C", "D"]
        })
    );
}

#[tokio::test]
async fn identical_calls_send_identical_filters() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(200, json!({"results": []}))
            .respond(200, json!({"results": []})),
    );
    let registry = registry(&transport);
    let args = json!({"start_date": "6 months ago", "naics_codes": ["336411"]});

    call(&registry, "search_awards", args.clone()).await;
    call(&registry, "search_awards", args).await;

    assert_eq!(body(&transport, 0), body(&transport, 1));
    assert_eq!(
        body(&transport, 0)["filters"]["time_period"][0],
        json!({"start_date": "2023-09-15", "end_date": "2024-03-15"})
    );
}

#[tokio::test]
async fn new_awards_drop_modifications() {
    let transport = Arc::new(ScriptedTransport::new().respond(
        200,
        json!({"results": [
            {"Award ID": "BASE", "Mod": "0", "Action Date": "2024-03-14", "Transaction Amount": 10.0},
            {"Award ID": "MOD", "Mod": "1", "Action Date": "2024-03-13", "Transaction Amount": 5.0}
        ]}),
    ));
    let registry = registry(&transport);

    let data = payload(&call(&registry, "search_new_awards", json!({"date_range": "last week"})).await);
    assert_eq!(data["count"], 1);
    assert_eq!(data["results"][0]["id"], "BASE");
    assert_eq!(data["results"][0]["modificationNumber"], "0");
}

// ── Lookups ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn award_not_found_is_a_well_formed_payload() {
    let transport =
        Arc::new(ScriptedTransport::new().respond(404, json!({"detail": "No award found"})));
    let registry = registry(&transport);

    let result = call(&registry, "get_award_details", json!({"award_id": "CONT_AWD_NOPE"})).await;
    let data = payload(&result);
    assert_eq!(data["found"], false);
    assert!(data["summary"].as_str().unwrap().contains("CONT_AWD_NOPE"));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn recipient_search_with_no_hits() {
    let transport = Arc::new(ScriptedTransport::new().respond(200, json!({"results": []})));
    let registry = registry(&transport);

    let data = payload(&call(&registry, "search_recipients", json!({"search_text": "qqqq"})).await);
    assert_eq!(data["total"], 0);
    assert_eq!(data["results"], json!([]));
}

// ── Competition ──────────────────────────────────────────────────────────

#[tokio::test]
async fn competition_shares_sum_to_one_hundred() {
    let rows: Vec<Value> = [
        ("A", "ALPHA", 333.33),
        ("B", "BRAVO", 222.22),
        ("C", "CHARLIE", 111.11),
        ("D", "ALPHA", 50.0),
        ("E", "DELTA", 10.0),
        ("F", "ECHO", 1.0),
    ]
    .iter()
    .map(|(id, name, amount)| {
        json!({"Award ID": id, "Recipient Name": name, "Award Amount": amount})
    })
    .collect();
    let transport = Arc::new(ScriptedTransport::new().respond(200, json!({"results": rows})));
    let registry = registry(&transport);

    let data = payload(&call(&registry, "analyze_competition", json!({"limit": 3})).await);
    let top = data["top_recipients"].as_array().unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0]["recipient_name"], "ALPHA");
    assert_eq!(data["unique_recipients"], 5);
    assert_eq!(data["total_awards_analyzed"], 6);

    let sum: f64 = top
        .iter()
        .map(|r| r["market_share_pct"].as_f64().unwrap())
        .sum();
    assert!((sum - 100.0).abs() < 0.05, "sum was {sum}");

    assert_eq!(
        body(&transport, 0)["filters"]["time_period"][0],
        json!({"start_date": "2023-03-15", "end_date": "2024-03-15"})
    );
}

// ── Failure rendering ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn rate_limit_exhaustion_becomes_error_text() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(429, json!({}))
            .respond(429, json!({}))
            .respond(429, json!({})),
    );
    let registry = registry(&transport);

    let result = call(&registry, "get_spending_over_time", json!({})).await;
    assert!(!result.success);
    assert!(result.output.starts_with("Error: "));
    assert!(result.output.contains("Rate limit exceeded after 2 retries"));
    assert!(serde_json::from_str::<Value>(&result.output).is_err());
    assert_eq!(transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn timeout_is_reported_distinctly() {
    let transport = Arc::new(ScriptedTransport::new().respond_after(
        Duration::from_secs(600),
        200,
        json!({"results": []}),
    ));
    let registry = registry(&transport);

    let result = call(&registry, "search_awards", json!({})).await;
    assert!(!result.success);
    assert!(result.output.contains("timed out after 90s"));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn unknown_tool_and_bad_arguments() {
    let transport = Arc::new(ScriptedTransport::new());
    let registry = registry(&transport);

    let result = call(&registry, "delete_everything", json!({})).await;
    assert!(!result.success);
    assert_eq!(result.output, "Error: Tool not found: delete_everything");

    let result = call(&registry, "search_awards", json!({"limit": "lots"})).await;
    assert!(!result.success);
    assert!(result.output.starts_with("Error: Invalid tool arguments"));
    assert_eq!(transport.calls(), 0);
}

// ── Throttle ─────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn back_to_back_tool_calls_are_spaced() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .respond(200, json!({"results": []}))
            .respond(200, json!({"results": []})),
    );
    let registry = registry_with(&transport, 100);

    call(&registry, "search_recipients", json!({"search_text": "acme"})).await;
    call(&registry, "search_recipients", json!({"search_text": "beta"})).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].at - requests[0].at >= Duration::from_millis(100));
}

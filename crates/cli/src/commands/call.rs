//! `spendlens call`: Invoke one tool and print its payload.

use chrono::NaiveDate;
use spendlens_core::ToolCall;
use spendlens_query::Clock;
use tracing::debug;

/// Returns whether the tool reported success.
pub async fn run(
    name: &str,
    args: &str,
    today: Option<NaiveDate>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let arguments: serde_json::Value =
        serde_json::from_str(args).map_err(|e| format!("--args is not valid JSON: {e}"))?;

    let config = super::load_config()?;
    let clock = today.map(Clock::Fixed).unwrap_or_default();
    let registry = super::build_registry(&config, clock)?;

    debug!(tool = %name, today = %clock.today(), "Invoking tool");
    let result = registry
        .invoke(&ToolCall {
            id: "cli".into(),
            name: name.to_string(),
            arguments,
        })
        .await;

    println!("{}", result.output);
    Ok(result.success)
}

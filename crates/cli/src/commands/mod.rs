pub mod call;
pub mod config_cmd;
pub mod status;
pub mod tools;

use spendlens_client::SpendingClient;
use spendlens_config::AppConfig;
use spendlens_core::ToolRegistry;
use spendlens_query::Clock;
use spendlens_tools::ToolContext;
use std::sync::Arc;

/// Load configuration, mapping failures to a readable message.
pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Build the tool registry over a real HTTP client.
pub fn build_registry(
    config: &AppConfig,
    clock: Clock,
) -> Result<ToolRegistry, Box<dyn std::error::Error>> {
    let client = SpendingClient::new(&config.api)?;
    let ctx = ToolContext::new(Arc::new(client), clock, config.tools.clone());
    Ok(spendlens_tools::default_registry(Arc::new(ctx)))
}

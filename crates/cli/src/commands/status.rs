//! `spendlens status`: Show the effective configuration.

use spendlens_config::AppConfig;
use spendlens_query::Clock;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let registry = super::build_registry(&config, Clock::System)?;

    println!("spendlens status");
    println!("================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  API:            {}", config.api.base_url);
    println!("  Request delay:  {}ms", config.api.request_delay_ms);
    println!(
        "  Retries:        {} (base backoff {}ms)",
        config.api.max_retries, config.api.retry_base_delay_ms
    );
    println!("  Timeout:        {}s", config.api.timeout_secs);
    println!("  Default limit:  {}", config.tools.default_limit);
    println!("  Tools:          {}", registry.len());
    println!("  Today:          {}", Clock::System.today());

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file; using defaults (see `spendlens config`)");
    }

    Ok(())
}

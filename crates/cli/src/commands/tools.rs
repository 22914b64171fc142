//! `spendlens tools`: List available tools.

use spendlens_query::Clock;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let registry = super::build_registry(&config, Clock::System)?;
    let definitions = registry.definitions();

    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    println!("Available tools ({}):", definitions.len());
    for def in &definitions {
        println!();
        println!("  {}", def.name);
        println!("    {}", def.description);
        if let Some(props) = def.parameters["properties"].as_object() {
            let mut names: Vec<&str> = props.keys().map(|k| k.as_str()).collect();
            names.sort_unstable();
            println!("    params: {}", names.join(", "));
        }
    }

    Ok(())
}

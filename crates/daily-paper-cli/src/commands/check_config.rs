use std::path::Path;

use anyhow::Result;

use daily_paper_core::Config;

pub fn run(config: &Config, path: &Path) -> Result<()> {
    println!("Configuration OK: {}\n", path.display());
    print!("{}", render_masked(config)?);
    println!("\nStorage directory: {}", config.storage_dir().display());
    Ok(())
}

/// Render the config as YAML with the API key masked
fn render_masked(config: &Config) -> Result<String> {
    let mut masked = config.clone();
    masked.llm.api_key = mask_secret(&config.llm.api_key);
    Ok(serde_yaml::to_string(&masked)?)
}

fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return "(not set)".to_string();
    }
    if count <= 8 {
        return "*".repeat(count);
    }
    let prefix: String = secret.chars().take(3).collect();
    let suffix: String = secret.chars().skip(count - 4).collect();
    format!("{}...{}", prefix, suffix)
}

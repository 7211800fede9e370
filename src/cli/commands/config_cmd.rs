//! Configuration display command.

use console::style;

use crate::cli::icons::dim_arrow;
use crate::config::{Config, Settings};

/// Print the effective settings and where they came from.
pub async fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("Configuration").bold());
    println!("{}", "-".repeat(50));

    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults (no config file found)".to_string());
    println!("  {} Source:        {}", dim_arrow(), source);
    println!("  {} Data dir:      {}", dim_arrow(), settings.data_dir.display());
    println!(
        "  {} Documents:     {}",
        dim_arrow(),
        settings.documents_dir.display()
    );
    println!(
        "  {} Session file:  {}",
        dim_arrow(),
        settings.session_path().display()
    );
    println!("  {} Endpoint:      {}", dim_arrow(), settings.analysis_endpoint);
    println!(
        "  {} API token:     {}",
        dim_arrow(),
        if settings.api_token.is_some() {
            style("set").green()
        } else {
            style("not set").dim()
        }
    );
    let timeout = settings
        .request_timeout
        .map(|secs| format!("{}s", secs))
        .unwrap_or_else(|| "none".to_string());
    println!("  {} Timeout:       {}", dim_arrow(), timeout);
    println!("  {} User agent:    {}", dim_arrow(), settings.user_agent);
    Ok(())
}

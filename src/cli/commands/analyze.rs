//! Report analysis command.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use crate::cli::icons::{dim_arrow, info, success};
use crate::config::Settings;
use crate::render::render_report;
use crate::upload::{CandidateFile, HttpTransport, UiState, UploadMachine};
use crate::utils::format_size;

/// Validate, upload and render one report image.
pub async fn cmd_analyze(
    settings: &Settings,
    file: &Path,
    json: bool,
    endpoint: Option<&str>,
) -> anyhow::Result<()> {
    let mut transport_config = settings.transport_config();
    if let Some(endpoint) = endpoint {
        transport_config.endpoint = endpoint.to_string();
    }
    Url::parse(&transport_config.endpoint)
        .with_context(|| format!("Invalid analysis endpoint: {}", transport_config.endpoint))?;

    let candidate = CandidateFile::from_path(file).await?;

    let mut machine = UploadMachine::new();
    machine.select(candidate)?;

    if let UiState::Selected(selected) = machine.state() {
        eprintln!(
            "{} Uploading {} ({}, {})",
            info(),
            selected.name(),
            selected.mime_type(),
            format_size(selected.size_bytes())
        );
        eprintln!("  {} Endpoint: {}", dim_arrow(), transport_config.endpoint);
    }

    let transport = HttpTransport::new(transport_config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.set_message("Analyzing report...");
    pb.enable_steady_tick(Duration::from_millis(100));

    machine.submit(&transport).await;
    pb.finish_and_clear();

    match machine.state() {
        UiState::Succeeded(model) => {
            if json {
                println!("{}", serde_json::to_string_pretty(model)?);
            } else {
                eprintln!("{} Analysis complete", success());
                println!();
                print!("{}", render_report(model));
            }
            Ok(())
        }
        UiState::Failed { message, .. } => anyhow::bail!("{}", message),
        other => anyhow::bail!("Analysis did not finish (state: {})", other.name()),
    }
}

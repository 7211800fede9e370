//! Upload pre-check command.

use std::path::Path;

use crate::cli::icons::success;
use crate::upload::{validate, CandidateFile};
use crate::utils::format_size;

/// Run upload validation only; nothing is sent.
pub async fn cmd_check(file: &Path) -> anyhow::Result<()> {
    let candidate = CandidateFile::from_path(file).await?;

    let accepted = validate(candidate)?;
    println!(
        "{} {} is ready for analysis ({}, {})",
        success(),
        accepted.name(),
        accepted.mime_type(),
        format_size(accepted.size_bytes())
    );
    Ok(())
}

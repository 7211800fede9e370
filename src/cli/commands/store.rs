//! Local document store command.

use std::path::Path;

use crate::cli::icons::{dim_arrow, success};
use crate::config::Settings;
use crate::storage::{compute_hash, DocumentStore, LocalDocumentStore};
use crate::upload::{validate, CandidateFile};

/// Store a report image and print the URL it can be referenced by.
pub async fn cmd_store(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let candidate = CandidateFile::from_path(file).await?;
    let accepted = validate(candidate)?;

    let store = LocalDocumentStore::new(&settings.documents_dir);
    let content = accepted.content();
    let url = store
        .put(accepted.name(), accepted.mime_type(), &content)
        .await?;

    println!("{} Stored {}", success(), accepted.name());
    println!("  {} URL: {}", dim_arrow(), url);
    println!("  {} SHA-256: {}", dim_arrow(), &compute_hash(&content)[..16]);
    Ok(())
}

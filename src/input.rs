use std::path::Path;

use log::info;

use crate::error::{Result, ScanError};

pub async fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ScanError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(text
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Reads the domain and payload lists. Order is kept and nothing is deduplicated.
pub async fn load(domains: &Path, payloads: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let domains_list = read_lines(domains).await?;
    let payloads_list = read_lines(payloads).await?;
    info!(
        "Loaded {} domains from {} and {} payloads from {}",
        domains_list.len(),
        domains.display(),
        payloads_list.len(),
        payloads.display()
    );
    Ok((domains_list, payloads_list))
}

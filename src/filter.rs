use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::artifact::Artifact;
use crate::cleaner::{Workspace, DISCOVERY_ARTIFACT, FILTER_ARTIFACT};
use crate::discovery::parse_candidates;
use crate::error::{Result, ScanError};
use crate::tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VulnClass {
    Lfi,
}

impl VulnClass {
    pub fn tag(&self) -> &'static str {
        match self {
            VulnClass::Lfi => "lfi",
        }
    }
}

impl fmt::Display for VulnClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[async_trait]
pub trait ParamFilter: Send + Sync {
    async fn filter(
        &self,
        artifact: &Artifact,
        class: VulnClass,
        workspace: &Workspace,
    ) -> Result<Vec<String>>;
}

/// Pattern filter backed by `gf <tag> <file>`.
#[derive(Debug, Clone)]
pub struct Gf {
    pub program: String,
    pub timeout: Duration,
}

impl Default for Gf {
    fn default() -> Self {
        Gf {
            program: "gf".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

#[async_trait]
impl ParamFilter for Gf {
    async fn filter(
        &self,
        artifact: &Artifact,
        class: VulnClass,
        workspace: &Workspace,
    ) -> Result<Vec<String>> {
        let input = artifact
            .materialize(&workspace.file(DISCOVERY_ARTIFACT))
            .await
            .map_err(|e| ScanError::FilterFailure { reason: e.to_string() })?;
        if !input.exists() {
            return Err(ScanError::ArtifactMissing { path: input });
        }

        let args = vec![class.tag().to_string(), input.to_string_lossy().into_owned()];
        let output = tool::run(&self.program, &args, self.timeout)
            .await
            .map_err(|e| ScanError::FilterFailure { reason: e.to_string() })?;
        if !output.success {
            return Err(ScanError::FilterFailure {
                reason: format!("{} exited unsuccessfully: {}", self.program, output.stderr.trim()),
            });
        }

        let filtered_path = workspace.file(FILTER_ARTIFACT);
        tokio::fs::write(&filtered_path, &output.stdout)
            .await
            .map_err(|e| ScanError::io(&filtered_path, e))?;

        let lines = Artifact::File(filtered_path).lines().await?;
        Ok(extract_parameters(&lines))
    }
}

/// Keeps every discovered parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl ParamFilter for PassThrough {
    async fn filter(
        &self,
        artifact: &Artifact,
        _class: VulnClass,
        _workspace: &Workspace,
    ) -> Result<Vec<String>> {
        let lines = artifact.lines().await?;
        Ok(dedup(
            parse_candidates(&lines)
                .into_iter()
                .map(|candidate| candidate.parameter),
        ))
    }
}

/// Parameter names from filter output: query names of URL lines, bare names otherwise.
pub fn extract_parameters(lines: &[String]) -> Vec<String> {
    let mut names = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Url::parse(line) {
            Ok(parsed_url) => names.extend(
                parsed_url
                    .query_pairs()
                    .map(|(k, _)| k.to_string())
                    .filter(|k| !k.is_empty()),
            ),
            Err(_) => names.push(line.to_string()),
        }
    }
    dedup(names.into_iter())
}

fn dedup(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.filter(|name| seen.insert(name.clone())).collect()
}

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::artifact::Artifact;
use crate::cleaner::{Workspace, DISCOVERY_ARTIFACT};
use crate::error::{Result, ScanError};
use crate::tool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub parameter: String,
}

#[async_trait]
pub trait Discoverer: Send + Sync {
    async fn discover(&self, domain: &str, workspace: &Workspace) -> Result<Artifact>;
}

#[derive(Debug, Clone)]
pub struct ParamSpider {
    pub program: String,
    pub level: u32,
    pub exclude: String,
    pub timeout: Duration,
}

impl Default for ParamSpider {
    fn default() -> Self {
        ParamSpider {
            program: "paramspider".to_string(),
            level: 2,
            exclude: "static".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

impl ParamSpider {
    fn args(&self, domain: &str, output: &str) -> Vec<String> {
        vec![
            "-d".to_string(),
            domain.to_string(),
            "--level".to_string(),
            self.level.to_string(),
            "--exclude".to_string(),
            self.exclude.clone(),
            "--output".to_string(),
            output.to_string(),
        ]
    }
}

#[async_trait]
impl Discoverer for ParamSpider {
    async fn discover(&self, domain: &str, workspace: &Workspace) -> Result<Artifact> {
        let output_path = workspace.file(DISCOVERY_ARTIFACT);
        let args = self.args(domain, &output_path.to_string_lossy());
        let output = tool::run(&self.program, &args, self.timeout)
            .await
            .map_err(|e| ScanError::DiscoveryFailure {
                domain: domain.to_string(),
                reason: e.to_string(),
            })?;
        if !output.success {
            return Err(ScanError::DiscoveryFailure {
                domain: domain.to_string(),
                reason: format!("{} exited unsuccessfully: {}", self.program, output.stderr.trim()),
            });
        }
        Ok(Artifact::File(output_path))
    }
}

/// Every `(url, parameter)` pair carried by the query strings of `lines`.
pub fn parse_candidates(lines: &[String]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for line in lines {
        let parsed_url = match Url::parse(line.trim()) {
            Ok(url) => url,
            Err(_) => continue,
        };
        for (name, _) in parsed_url.query_pairs() {
            if name.is_empty() {
                continue;
            }
            candidates.push(Candidate {
                url: line.trim().to_string(),
                parameter: name.to_string(),
            });
        }
    }
    candidates
}

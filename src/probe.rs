use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{Result, ScanError};
use crate::tool;

pub const SUCCESS_STATUS: u16 = 200;

/// Content-discovery step run once per injection task. Returns the responding
/// URLs that reported a success status; each one is handed to the verifier.
#[async_trait]
pub trait ContentProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct Feroxbuster {
    pub program: String,
    pub request_timeout: Duration,
    pub run_timeout: Duration,
}

impl Default for Feroxbuster {
    fn default() -> Self {
        Feroxbuster {
            program: "feroxbuster".to_string(),
            request_timeout: Duration::from_secs(10),
            run_timeout: Duration::from_secs(600),
        }
    }
}

impl Feroxbuster {
    fn args(&self, url: &str) -> Vec<String> {
        vec![
            "-u".to_string(),
            url.to_string(),
            "-n".to_string(),
            "-q".to_string(),
            "--timeout".to_string(),
            self.request_timeout.as_secs().max(1).to_string(),
        ]
    }
}

#[async_trait]
impl ContentProbe for Feroxbuster {
    async fn probe(&self, url: &str) -> Result<Vec<String>> {
        // stdout is captured per task; no report file is shared between tasks
        let output = tool::run(&self.program, &self.args(url), self.run_timeout)
            .await
            .map_err(|e| ScanError::ProbeFailure {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !output.success && output.stdout.trim().is_empty() {
            return Err(ScanError::ProbeFailure {
                url: url.to_string(),
                reason: format!("{} exited unsuccessfully: {}", self.program, output.stderr.trim()),
            });
        }
        Ok(parse_report(&output.stdout))
    }
}

/// Skips content discovery and verifies the constructed URL directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

#[async_trait]
impl ContentProbe for Passthrough {
    async fn probe(&self, url: &str) -> Result<Vec<String>> {
        Ok(vec![url.to_string()])
    }
}

/// Responding URLs of report lines whose leading status is a success.
pub fn parse_report(report: &str) -> Vec<String> {
    let mut hits = Vec::new();
    for line in report.lines() {
        let mut tokens = line.split_whitespace();
        let status = match tokens.next().and_then(|t| t.parse::<u16>().ok()) {
            Some(status) => status,
            None => continue,
        };
        if status != SUCCESS_STATUS {
            continue;
        }
        let responding = line
            .split_whitespace()
            .rev()
            .find(|t| t.starts_with("http://") || t.starts_with("https://"));
        if let Some(url) = responding {
            if Url::parse(url).is_ok() && !hits.iter().any(|h| h == url) {
                hits.push(url.to_string());
            }
        }
    }
    hits
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::Level;
use reqwest::Client;

use crate::error::{Result, ScanError};
use crate::logging::Reporter;

pub const SIGNATURES: [&str; 2] = ["root:x:0:0:", "/etc/passwd"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Confirmed,
    NotConfirmed,
    /// The confirmation request itself failed, so nothing is known.
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub url: String,
    pub verdict: Verdict,
}

/// Fetches the body used to confirm a candidate. Kept separate from the
/// content probe so confirmation always issues its own request.
#[async_trait]
pub trait ConfirmationProbe: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct HttpConfirmation {
    client: Client,
}

impl HttpConfirmation {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(timeout)
            .build()
            .map_err(ScanError::HttpClient)?;
        Ok(HttpConfirmation { client })
    }
}

#[async_trait]
impl ConfirmationProbe for HttpConfirmation {
    async fn fetch(&self, url: &str) -> Result<String> {
        let transport = |source| ScanError::ProbeTransport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(transport)?;
        response.text().await.map_err(transport)
    }
}

pub fn contains_signature(body: &str) -> bool {
    SIGNATURES.iter().any(|signature| body.contains(signature))
}

pub struct Verifier {
    probe: Arc<dyn ConfirmationProbe>,
}

impl Verifier {
    pub fn new(probe: Arc<dyn ConfirmationProbe>) -> Self {
        Verifier { probe }
    }

    pub async fn verify(&self, url: &str, reporter: &dyn Reporter) -> ScanResult {
        let verdict = match self.probe.fetch(url).await {
            Ok(body) if contains_signature(&body) => {
                reporter.log(Level::Info, &format!("LFI confirmed at {}", url));
                Verdict::Confirmed
            }
            Ok(_) => Verdict::NotConfirmed,
            Err(e) => {
                reporter.log(Level::Error, &format!("Error checking LFI at {}: {}", url, e));
                Verdict::Inconclusive
            }
        };
        ScanResult {
            url: url.to_string(),
            verdict,
        }
    }
}

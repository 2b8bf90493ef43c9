use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::Level;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, ScanError};
use crate::logging::Reporter;
use crate::verifier::{ScanResult, Verdict};

#[derive(Default)]
struct Collected {
    confirmed: Vec<String>,
    seen: HashSet<String>,
    inconclusive: usize,
}

/// Shared by every task of one domain. Keeps confirmed URLs in arrival order.
#[derive(Clone, Default)]
pub struct ResultCollector {
    inner: Arc<Mutex<Collected>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `result` is a confirmed URL not seen before.
    pub fn record(&self, result: &ScanResult) -> bool {
        let mut collected = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match result.verdict {
            Verdict::Confirmed => {
                if collected.seen.insert(result.url.clone()) {
                    collected.confirmed.push(result.url.clone());
                    true
                } else {
                    false
                }
            }
            Verdict::Inconclusive => {
                collected.inconclusive += 1;
                false
            }
            Verdict::NotConfirmed => false,
        }
    }

    pub fn confirmed(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(guard) => guard.confirmed.clone(),
            Err(poisoned) => poisoned.into_inner().confirmed.clone(),
        }
    }

    pub fn inconclusive(&self) -> usize {
        match self.inner.lock() {
            Ok(guard) => guard.inconclusive,
            Err(poisoned) => poisoned.into_inner().inconclusive,
        }
    }
}

/// Output file that only ever grows.
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: PathBuf,
}

impl OutputSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        OutputSink { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, urls: &[String]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ScanError::io(&self.path, e))?;
        let mut batch = String::new();
        for url in urls {
            batch.push_str(url);
            batch.push('\n');
        }
        file.write_all(batch.as_bytes())
            .await
            .map_err(|e| ScanError::io(&self.path, e))?;
        file.flush().await.map_err(|e| ScanError::io(&self.path, e))
    }
}

/// Appends the domain's confirmed URLs to the sink. Returns how many were written.
pub async fn flush(
    collector: &ResultCollector,
    sink: &OutputSink,
    reporter: &dyn Reporter,
) -> usize {
    let urls = collector.confirmed();
    if urls.is_empty() {
        return 0;
    }
    match sink.append(&urls).await {
        Ok(()) => {
            reporter.log(
                Level::Info,
                &format!("Results written to {}", sink.path().display()),
            );
            urls.len()
        }
        Err(e) => {
            reporter.log(Level::Error, &format!("Failed to write results: {}", e));
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RecordingReporter;

    fn confirmed(url: &str) -> ScanResult {
        ScanResult {
            url: url.to_string(),
            verdict: Verdict::Confirmed,
        }
    }

    #[test]
    fn keeps_arrival_order_and_drops_repeats() {
        let collector = ResultCollector::new();
        assert!(collector.record(&confirmed("http://a.test?b=1")));
        assert!(collector.record(&confirmed("http://a.test?a=1")));
        assert!(!collector.record(&confirmed("http://a.test?b=1")));
        assert!(!collector.record(&ScanResult {
            url: "http://a.test?c=1".to_string(),
            verdict: Verdict::NotConfirmed,
        }));
        collector.record(&ScanResult {
            url: "http://a.test?d=1".to_string(),
            verdict: Verdict::Inconclusive,
        });

        assert_eq!(collector.confirmed(), vec!["http://a.test?b=1", "http://a.test?a=1"]);
        assert_eq!(collector.inconclusive(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_not_lost() {
        let collector = ResultCollector::new();
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let collector = collector.clone();
                tokio::spawn(async move {
                    collector.record(&confirmed(&format!("http://a.test?p={}", i)));
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(collector.confirmed().len(), 64);
    }

    #[tokio::test]
    async fn flush_appends_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path().join("out.txt"));
        std::fs::write(sink.path(), "http://earlier.test?file=x\n").unwrap();
        let reporter = RecordingReporter::new();

        let first = ResultCollector::new();
        first.record(&confirmed("http://a.test?file=1"));
        assert_eq!(flush(&first, &sink, &reporter).await, 1);

        let second = ResultCollector::new();
        second.record(&confirmed("http://b.test?file=2"));
        second.record(&confirmed("http://b.test?file=3"));
        assert_eq!(flush(&second, &sink, &reporter).await, 2);

        let written = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(
            written.lines().collect::<Vec<_>>(),
            vec![
                "http://earlier.test?file=x",
                "http://a.test?file=1",
                "http://b.test?file=2",
                "http://b.test?file=3",
            ]
        );
        assert_eq!(reporter.count(Level::Info, "Results written to"), 2);
    }

    #[tokio::test]
    async fn empty_batches_leave_the_sink_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path().join("out.txt"));
        let reporter = RecordingReporter::new();
        assert_eq!(flush(&ResultCollector::new(), &sink, &reporter).await, 0);
        assert!(!sink.path().exists());
    }
}

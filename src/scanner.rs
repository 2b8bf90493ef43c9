use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::Level;

use crate::aggregator::{self, OutputSink, ResultCollector};
use crate::artifact::Artifact;
use crate::cleaner::{self, Workspace};
use crate::discovery::{parse_candidates, Discoverer};
use crate::filter::{ParamFilter, VulnClass};
use crate::scheduler::{self, TaskContext};
use crate::task;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub threads: usize,
    pub scratch_root: PathBuf,
    pub class: VulnClass,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            threads: 12,
            scratch_root: PathBuf::from(".lfininja"),
            class: VulnClass::Lfi,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainReport {
    pub domain: String,
    pub parameters: usize,
    pub tasks: usize,
    pub completed: u64,
    pub confirmed: usize,
    pub inconclusive: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub domains_scanned: usize,
    pub tasks: usize,
    pub confirmed: usize,
    pub inconclusive: usize,
    pub cancelled: bool,
}

/// What an operator interrupt means at this point of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Let in-flight tasks finish, flush, then stop.
    Drain,
    /// A stop was already requested; give up immediately.
    Abort,
}

pub fn interrupt(stop: &AtomicBool) -> Interrupt {
    if stop.swap(true, Ordering::SeqCst) {
        Interrupt::Abort
    } else {
        Interrupt::Drain
    }
}

pub struct Scanner {
    pub discoverer: Arc<dyn Discoverer>,
    pub filter: Arc<dyn ParamFilter>,
    pub ctx: TaskContext,
    pub sink: OutputSink,
    pub config: ScanConfig,
}

impl Scanner {
    fn log(&self, level: Level, message: &str) {
        self.ctx.reporter.log(level, message);
    }

    /// Discover, filter, inject, verify, flush and clean up one domain.
    /// Failures before scheduling leave the domain with no parameters.
    pub async fn process_domain(&self, domain: &str, payloads: &[String]) -> DomainReport {
        let mut report = DomainReport {
            domain: domain.to_string(),
            ..Default::default()
        };

        let workspace = match Workspace::create(&self.config.scratch_root, domain).await {
            Ok(workspace) => workspace,
            Err(e) => {
                self.log(Level::Error, &format!("Skipping {}: {}", domain, e));
                return report;
            }
        };

        self.log(Level::Info, &format!("Running parameter discovery for {}", domain));
        let artifact = match self.discoverer.discover(domain, &workspace).await {
            Ok(artifact) => artifact,
            Err(e) => {
                self.log(Level::Warn, &e.to_string());
                Artifact::empty()
            }
        };
        let discovered = match artifact.lines().await {
            Ok(lines) => parse_candidates(&lines),
            Err(e) => {
                self.log(Level::Warn, &e.to_string());
                Vec::new()
            }
        };

        let parameters = if discovered.is_empty() {
            self.log(Level::Info, &format!("No candidate parameters found for {}", domain));
            Vec::new()
        } else {
            self.log(
                Level::Info,
                &format!("Filtering parameters using the {} pattern", self.config.class),
            );
            match self.filter.filter(&artifact, self.config.class, &workspace).await {
                Ok(parameters) => parameters,
                Err(e) => {
                    self.log(Level::Warn, &e.to_string());
                    Vec::new()
                }
            }
        };
        report.parameters = parameters.len();

        let tasks = task::generate(domain, &parameters, payloads);
        report.tasks = tasks.len();
        self.log(
            Level::Info,
            &format!(
                "{} injection tasks for {} ({} parameters)",
                tasks.len(),
                domain,
                parameters.len()
            ),
        );

        let collector = ResultCollector::new();
        if !tasks.is_empty() {
            let outcome =
                scheduler::run_domain(domain, tasks, self.config.threads, &self.ctx, &collector)
                    .await;
            report.completed = outcome.completed + outcome.skipped;
        }

        report.confirmed =
            aggregator::flush(&collector, &self.sink, self.ctx.reporter.as_ref()).await;
        report.inconclusive = collector.inconclusive();

        cleaner::cleanup(&workspace, self.ctx.reporter.as_ref()).await;
        report
    }

    /// Processes domains one after another. A stop request ends the run after
    /// the current domain has been flushed and cleaned up.
    pub async fn run(&self, domains: &[String], payloads: &[String]) -> RunSummary {
        let mut summary = RunSummary::default();
        for domain in domains {
            if self.ctx.stop.load(Ordering::Relaxed) {
                summary.cancelled = true;
                break;
            }
            let report = self.process_domain(domain, payloads).await;
            summary.domains_scanned += 1;
            summary.tasks += report.tasks;
            summary.confirmed += report.confirmed;
            summary.inconclusive += report.inconclusive;
        }
        if self.ctx.stop.load(Ordering::Relaxed) {
            summary.cancelled = true;
            self.log(Level::Warn, "Scan interrupted, remaining domains skipped");
        }
        cleaner::remove_root_if_empty(&self.config.scratch_root).await;
        summary
    }
}

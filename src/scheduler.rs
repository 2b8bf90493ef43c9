use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures::stream::{self, StreamExt};
use log::Level;

use crate::aggregator::ResultCollector;
use crate::logging::Reporter;
use crate::probe::ContentProbe;
use crate::task::InjectionTask;
use crate::verifier::Verifier;

/// Everything a task needs, shared across the worker pool.
#[derive(Clone)]
pub struct TaskContext {
    pub probe: Arc<dyn ContentProbe>,
    pub verifier: Arc<Verifier>,
    pub reporter: Arc<dyn Reporter>,
    pub stop: Arc<AtomicBool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Ran,
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainOutcome {
    pub completed: u64,
    pub skipped: u64,
}

/// Runs one domain's tasks with at most `threads` in flight and returns once
/// all of them have finished. Results land in `collector` in completion order.
pub async fn run_domain(
    domain: &str,
    tasks: Vec<InjectionTask>,
    threads: usize,
    ctx: &TaskContext,
    collector: &ResultCollector,
) -> DomainOutcome {
    let total = tasks.len() as u64;
    ctx.reporter.begin_domain(domain, total);

    let jobs: Vec<_> = tasks
        .into_iter()
        .map(|task| {
            let ctx = ctx.clone();
            let collector = collector.clone();
            async move {
                if ctx.stop.load(Ordering::Relaxed) {
                    return TaskOutcome::Skipped;
                }

                let url = task.url();
                ctx.reporter
                    .log(Level::Info, &format!("Running content probe for {}", url));
                let hits = match ctx.probe.probe(&url).await {
                    Ok(hits) => hits,
                    Err(e) => {
                        ctx.reporter.log(Level::Error, &e.to_string());
                        return TaskOutcome::Ran;
                    }
                };

                for hit in hits {
                    let result = ctx.verifier.verify(&hit, ctx.reporter.as_ref()).await;
                    if collector.record(&result) {
                        ctx.reporter.found(&result.url);
                    }
                }
                TaskOutcome::Ran
            }
        })
        .collect();

    let mut outcome = DomainOutcome::default();
    let mut stream = stream::iter(jobs).buffer_unordered(threads.max(1));
    while let Some(task_outcome) = stream.next().await {
        match task_outcome {
            TaskOutcome::Ran => outcome.completed += 1,
            TaskOutcome::Skipped => outcome.skipped += 1,
        }
        ctx.reporter.advance();
    }

    ctx.reporter.finish_domain();
    outcome
}

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::Level;

use crate::error::{Result, ScanError};

/// Routes `log` records to an append-only file, one timestamped line each.
pub fn init_log_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ScanError::LogSetup {
            path: path.to_path_buf(),
            source,
        })?;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Log and progress sink handed to the scheduler and aggregator.
pub trait Reporter: Send + Sync {
    fn log(&self, level: Level, message: &str);
    fn begin_domain(&self, domain: &str, total: u64);
    fn advance(&self);
    fn finish_domain(&self);
    fn found(&self, url: &str);
}

pub struct ConsoleReporter {
    verbose: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        ConsoleReporter {
            verbose,
            bar: Mutex::new(None),
        }
    }

    fn println(&self, line: String) {
        match self.bar.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(bar) => bar.println(line),
                None => println!("{}", line),
            },
            Err(_) => println!("{}", line),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn log(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
        if self.verbose && level <= Level::Warn {
            self.println(format!("{}: {}", level.to_string().yellow(), message));
        }
    }

    fn begin_domain(&self, domain: &str, total: u64) {
        let bar = ProgressBar::new(total);
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(200));
        if let Ok(style) = ProgressStyle::with_template(
            "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise})",
        ) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message(format!("Testing {} for LFI...", domain));
        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn advance(&self) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                bar.inc(1);
            }
        }
    }

    fn finish_domain(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }

    fn found(&self, url: &str) {
        self.println(format!("{}: {}", "LFI FOUND".red().bold(), url));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRecord {
    pub domain: String,
    pub total: u64,
    pub position: u64,
    pub finished: bool,
}

/// In-memory reporter for tests and embedding.
#[derive(Default)]
pub struct RecordingReporter {
    entries: Mutex<Vec<(Level, String)>>,
    progress: Mutex<Vec<ProgressRecord>>,
    found: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, level: Level, needle: &str) -> usize {
        self.entries()
            .iter()
            .filter(|(l, m)| *l == level && m.contains(needle))
            .count()
    }

    pub fn progress(&self) -> Vec<ProgressRecord> {
        self.progress.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn found_urls(&self) -> Vec<String> {
        self.found.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl Reporter for RecordingReporter {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }

    fn begin_domain(&self, domain: &str, total: u64) {
        if let Ok(mut progress) = self.progress.lock() {
            progress.push(ProgressRecord {
                domain: domain.to_string(),
                total,
                ..Default::default()
            });
        }
    }

    fn advance(&self) {
        if let Ok(mut progress) = self.progress.lock() {
            if let Some(current) = progress.last_mut() {
                current.position += 1;
            }
        }
    }

    fn finish_domain(&self) {
        if let Ok(mut progress) = self.progress.lock() {
            if let Some(current) = progress.last_mut() {
                current.finished = true;
            }
        }
    }

    fn found(&self, url: &str) {
        if let Ok(mut found) = self.found.lock() {
            found.push(url.to_string());
        }
    }
}

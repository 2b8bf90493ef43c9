pub mod aggregator;
pub mod artifact;
pub mod cleaner;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod input;
pub mod logging;
pub mod opt;
pub mod probe;
pub mod scanner;
pub mod scheduler;
pub mod task;
pub mod tool;
pub mod verifier;

pub use error::{Result, ScanError};
pub use scanner::{DomainReport, RunSummary, ScanConfig, Scanner};

use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use crate::scanner::ScanConfig;

#[derive(StructOpt, Debug)]
#[structopt(name = "lfininja", about = "Intelligent LFI vulnerability scanner")]
pub struct Opt {
    #[structopt(parse(from_os_str), help = "File containing list of domains")]
    pub domains_file: PathBuf,

    #[structopt(
        parse(from_os_str),
        help = "File containing list of LFI payloads"
    )]
    pub payloads_file: PathBuf,

    #[structopt(parse(from_os_str), help = "File to save identified vulnerabilities")]
    pub output_file: PathBuf,

    #[structopt(
        short,
        long,
        default_value = "12",
        help = "Number of threads for parallel processing"
    )]
    pub threads: usize,

    #[structopt(long, default_value = "10", help = "Per-probe timeout in seconds")]
    pub timeout: u64,

    #[structopt(
        long,
        default_value = "600",
        help = "Timeout in seconds for discovery and filtering tools"
    )]
    pub tool_timeout: u64,

    #[structopt(
        long,
        parse(from_os_str),
        default_value = ".lfininja",
        help = "Directory for per-domain scratch files"
    )]
    pub scratch_dir: PathBuf,

    #[structopt(
        long,
        parse(from_os_str),
        default_value = "lfi_scanner.log",
        help = "Append-only log file"
    )]
    pub log_file: PathBuf,

    #[structopt(long, default_value = "2", help = "ParamSpider crawl level")]
    pub level: u32,

    #[structopt(long, default_value = "static", help = "Extensions ParamSpider should exclude")]
    pub exclude: String,

    #[structopt(long, default_value = "paramspider", help = "ParamSpider binary")]
    pub paramspider: String,

    #[structopt(long, default_value = "gf", help = "gf binary")]
    pub gf: String,

    #[structopt(long, default_value = "feroxbuster", help = "Feroxbuster binary")]
    pub feroxbuster: String,

    #[structopt(long, help = "Test every discovered parameter instead of filtering with gf")]
    pub no_filter: bool,

    #[structopt(long, help = "Verify injected URLs directly instead of running feroxbuster first")]
    pub no_content_probe: bool,

    #[structopt(short, long, help = "Activates verbose mode")]
    pub verbose: bool,
}

impl Opt {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout.max(1))
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            threads: self.threads.max(1),
            scratch_root: self.scratch_dir.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_cli() {
        let opt = Opt::from_iter(&["lfininja", "domains.txt", "payloads.txt", "out.txt"]);
        assert_eq!(opt.threads, 12);
        assert_eq!(opt.probe_timeout(), Duration::from_secs(10));
        assert_eq!(opt.log_file, PathBuf::from("lfi_scanner.log"));
        assert!(!opt.no_filter);
        assert_eq!(opt.scan_config().threads, 12);
    }

    #[test]
    fn thread_count_is_at_least_one() {
        let opt = Opt::from_iter(&["lfininja", "d", "p", "o", "-t", "0"]);
        assert_eq!(opt.scan_config().threads, 1);
        let opt = Opt::from_iter(&["lfininja", "d", "p", "o", "--threads", "40"]);
        assert_eq!(opt.scan_config().threads, 40);
    }
}

use std::sync::{atomic::AtomicBool, Arc};

use colored::*;
use log::{error, info, warn};
use structopt::StructOpt;

use lfininja::aggregator::OutputSink;
use lfininja::discovery::{Discoverer, ParamSpider};
use lfininja::filter::{Gf, ParamFilter, PassThrough};
use lfininja::input;
use lfininja::logging::{self, ConsoleReporter};
use lfininja::opt::Opt;
use lfininja::probe::{ContentProbe, Feroxbuster, Passthrough};
use lfininja::scanner::{interrupt, Interrupt};
use lfininja::scheduler::TaskContext;
use lfininja::verifier::{HttpConfirmation, Verifier};
use lfininja::{Result, Scanner};

#[tokio::main]
async fn main() {
    let opt = Opt::from_args();
    if let Err(e) = run(opt).await {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(opt: Opt) -> Result<()> {
    logging::init_log_file(&opt.log_file)?;

    println!("{}", "LFI NINJA - Starting scan...".green().bold());

    let (domains, payloads) = input::load(&opt.domains_file, &opt.payloads_file).await?;
    let scanner = build_scanner(&opt)?;

    let stop = Arc::clone(&scanner.ctx.stop);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match interrupt(&stop) {
                Interrupt::Drain => {
                    warn!("Interrupt received, draining in-flight tasks");
                    eprintln!(
                        "{}",
                        "Interrupted - finishing current domain (Ctrl-C again to abort)...".yellow()
                    );
                }
                Interrupt::Abort => {
                    error!("Second interrupt received, aborting without flushing");
                    eprintln!("{}", "Aborted".red().bold());
                    std::process::exit(130);
                }
            }
        }
    });

    let summary = scanner.run(&domains, &payloads).await;
    info!(
        "Scan finished: {} domains, {} tasks, {} confirmed, {} inconclusive",
        summary.domains_scanned, summary.tasks, summary.confirmed, summary.inconclusive
    );
    println!(
        "{} {} domains, {} tasks, {} confirmed ({} inconclusive). Results in {}",
        "Done:".green().bold(),
        summary.domains_scanned,
        summary.tasks,
        summary.confirmed,
        summary.inconclusive,
        opt.output_file.display()
    );
    Ok(())
}

fn build_scanner(opt: &Opt) -> Result<Scanner> {
    let discoverer: Arc<dyn Discoverer> = Arc::new(ParamSpider {
        program: opt.paramspider.clone(),
        level: opt.level,
        exclude: opt.exclude.clone(),
        timeout: opt.tool_timeout(),
    });

    let filter: Arc<dyn ParamFilter> = if opt.no_filter {
        Arc::new(PassThrough)
    } else {
        Arc::new(Gf {
            program: opt.gf.clone(),
            timeout: opt.tool_timeout(),
        })
    };

    let probe: Arc<dyn ContentProbe> = if opt.no_content_probe {
        Arc::new(Passthrough)
    } else {
        Arc::new(Feroxbuster {
            program: opt.feroxbuster.clone(),
            request_timeout: opt.probe_timeout(),
            run_timeout: opt.tool_timeout(),
        })
    };

    let confirmation = HttpConfirmation::new(opt.probe_timeout())?;

    Ok(Scanner {
        discoverer,
        filter,
        ctx: TaskContext {
            probe,
            verifier: Arc::new(Verifier::new(Arc::new(confirmation))),
            reporter: Arc::new(ConsoleReporter::new(opt.verbose)),
            stop: Arc::new(AtomicBool::new(false)),
        },
        sink: OutputSink::new(opt.output_file.clone()),
        config: opt.scan_config(),
    })
}

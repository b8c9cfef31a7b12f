#![forbid(unsafe_code)]

//! `treasury-counter` binary entry point.

use std::sync::Arc;

use clap::Parser;
use tokio::runtime::{Builder, Handle};
use tracing::info;
use tvl_dashboard::cli::Opts;
use tvl_dashboard::logging;
use tvl_dashboard::{AppError, TracingSink, TreasuryCounter, TreasuryPage, headless};
use tvl_fetch::TreasuryApi;
use tvl_runtime::Program;

fn main() {
    let opts = Opts::parse();
    if let Err(error) = run(&opts) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn build_page(opts: &Opts, runtime: Handle) -> TreasuryPage {
    let api = TreasuryApi::with_base_url(&opts.base_url);
    info!(endpoint = api.endpoint(), locale = %opts.locale, "starting treasury counter");
    let diagnostics = Arc::new(TracingSink);
    let counter = TreasuryCounter::new(Arc::new(api), runtime, diagnostics.clone())
        .locale(opts.number_locale());
    let page = TreasuryPage::new(counter, diagnostics);
    if opts.headless {
        page
    } else {
        page.exit_after(opts.exit_after())
    }
}

fn run(opts: &Opts) -> Result<(), AppError> {
    opts.validate()?;
    // Dropped last, after the terminal is restored.
    let _log_guard = logging::init(opts.log_format, &opts.log_destination())?;

    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("tvl-fetch")
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;
    let page = build_page(opts, runtime.handle().clone());

    if opts.headless {
        println!("{}", headless::render_snapshot(page, opts.width));
        return Ok(());
    }

    let mut program = Program::with_config(page, opts.program_config()).map_err(AppError::Terminal)?;
    program.run().map_err(AppError::Terminal)
}

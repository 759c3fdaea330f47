use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use warehouse::{
    status_channel, Args, Config, Console, Error, EventLog, Interrupt, Observers, Report, Runtime,
    Settings, Supervisor, Warehouse,
};

/* ---------- */

fn main() -> ExitCode {
    // Diagnostics go to stderr, the status display owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(report) => {
            println!("\n{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "the warehouse couldn't start");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<Report, Error> {
    let config = Config::resolve(args, &mut io::stdin().lock(), &mut io::stdout())?;
    let log = EventLog::open(&config.log_file)?;
    tracing::info!(path = %log.path().display(), plan = ?config.plan(), "starting");

    // Bound before any worker exists so that no interrupt is missed.
    let interrupt = Interrupt::register();
    let (board, renderer) = status_channel(io::stdout());

    let observers = Observers::new().with(log).with(board);
    let mut runtime = Runtime::new(Arc::new(Warehouse::new(config.plan(), observers)));

    runtime.launch_with_settings(Supervisor::new(interrupt), Settings::new().name("supervisor"))?;
    runtime.launch_with_settings(renderer, Settings::new().name("display"))?;
    runtime.staff(&config)?;

    if config.console {
        if let Err(err) = runtime.launch_detached(Console::stdio(), Settings::new().name("console")) {
            tracing::warn!(%err, "running without a console");
        }
    }

    runtime.wait();
    Ok(runtime.warehouse().report())
}

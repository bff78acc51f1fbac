mod args;
mod dash;

use clap::Parser;
use log::{debug, warn};
use snafu::ErrorCompat;

use crate::args::{Args, Command};
use crate::dash::{DashResult, Settings};

fn run(args: &Args) -> DashResult<()> {
    let (window, labels) = match &args.command {
        Command::Visuals { window, labels, .. } => (*window, labels.clone()),
        _ => (None, None),
    };
    let settings = Settings::resolve(
        args.config.as_deref(),
        args.store.as_deref(),
        args.document.as_deref(),
        window,
        labels,
    )?;
    debug!("settings: {:?}", settings);

    match &args.command {
        Command::Submit {
            category,
            name,
            value,
        } => dash::run_submit(&settings, category, name.as_deref(), *value),
        Command::Show => dash::run_show(&settings),
        Command::Visuals {
            category,
            out,
            reference,
            ..
        } => dash::run_visuals(
            &settings,
            category.as_deref(),
            out.as_deref(),
            reference.as_deref(),
        ),
    }
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            debug!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}

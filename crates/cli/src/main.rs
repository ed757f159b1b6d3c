// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! deploycheck binary entry point.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use deploycheck::cli::Cli;
use deploycheck::output_diagnostic::{print_error, print_result, print_warning};
use deploycheck::platform::CommandPlatform;
use deploycheck::report::{details, headline, summary};
use deploycheck::suite::{open_capture_log, Suite};

/// Exit code for configuration and scenario-loading errors
const EXIT_CONFIG: u8 = 2;

/// Exit code after an interrupt, as a shell reports SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut suite = match Suite::prepare(&cli) {
        Ok(suite) => suite,
        Err(e) => {
            print_error(e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if cli.list {
        for scenario in suite.scenarios() {
            match scenario.source() {
                Some(path) => println!("{}\t{}", scenario.name(), path.display()),
                None => println!("{}", scenario.name()),
            }
        }
        return ExitCode::SUCCESS;
    }

    if suite.scenarios().is_empty() {
        print_warning("no scenarios selected");
        return ExitCode::SUCCESS;
    }

    let log = match open_capture_log(cli.capture_log.as_deref()) {
        Ok(log) => log,
        Err(e) => {
            print_error(e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let platform = Arc::new(CommandPlatform::new(suite.harness().platform.clone()));
    tracing::info!(
        scenarios = suite.scenarios().len(),
        jobs = cli.jobs,
        stack = %suite.harness().stack,
        "starting run"
    );

    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(&cancel);

    let reports = match suite
        .run(platform, usize::from(cli.jobs), log, Arc::clone(&cancel))
        .await
    {
        Ok(reports) => reports,
        Err(e) => {
            print_error(e);
            return ExitCode::FAILURE;
        }
    };

    for report in &reports {
        let (tag, line) = headline(report);
        print_result(tag, line, details(report).as_deref());
    }
    println!("{}", summary(&reports));

    if let Err(e) = suite.save_status(&reports) {
        print_warning(format_args!("could not save status: {}", e));
    }

    if cancel.load(Ordering::SeqCst) {
        print_warning("interrupted; unfinished scenarios were stopped and torn down");
        return ExitCode::from(EXIT_INTERRUPTED);
    }
    if reports.iter().any(|r| r.outcome.is_failure()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// The first SIGINT raises `cancel` so running scenarios stop before their
/// next step and tear down; a second SIGINT exits immediately.
fn install_interrupt_handler(cancel: &Arc<AtomicBool>) {
    #[cfg(unix)]
    {
        use signal_hook::consts::SIGINT;
        use signal_hook::flag;

        // Checked before `register` sets the flag, so only a repeat interrupt exits.
        if let Err(e) =
            flag::register_conditional_shutdown(SIGINT, i32::from(EXIT_INTERRUPTED), Arc::clone(cancel))
        {
            print_warning(format_args!("failed to install SIGINT handler: {}", e));
            return;
        }
        if let Err(e) = flag::register(SIGINT, Arc::clone(cancel)) {
            print_warning(format_args!("failed to install SIGINT handler: {}", e));
        }
    }
    #[cfg(not(unix))]
    let _ = cancel;
}

/// `RUST_LOG` wins over `--log-level`; logs go to stderr.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter()));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

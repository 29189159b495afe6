//! nvolt - client-side encrypted secrets for machine fleets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nvolt::cli::output;
use nvolt::cli::{execute, Cli};
use nvolt::error::{Error, ErrorKind};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("NVOLT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("nvolt=debug")
        } else {
            EnvFilter::new("nvolt=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = hint(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

fn hint(e: &Error) -> Option<&'static str> {
    match e.kind() {
        ErrorKind::NotInitialized => Some("run: nvolt init"),
        ErrorKind::NoActiveOrg => Some("run: nvolt org use <org-id>"),
        ErrorKind::NotEnrolled => Some("run: nvolt enrol"),
        ErrorKind::AuthFailure if matches!(e, Error::Remote(_)) => Some("run: nvolt login"),
        ErrorKind::AuthFailure => Some("ask an enrolled machine to run: nvolt sync"),
        ErrorKind::NotFound => Some("run: nvolt envs"),
        _ => None,
    }
}

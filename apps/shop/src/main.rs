use std::{process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{ControllerOptions, FileSessionStore, HttpStorefront, SessionController};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod orchestration;
mod render;

use cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = config::load_settings(config::Overrides {
        api_url: args.api_url.clone(),
        session_file: args.session_file.clone(),
    })?;
    tracing::info!(
        api_url = %settings.api_url,
        session_file = %settings.session_file.display(),
        "settings loaded"
    );

    let mut controller = SessionController::start(
        Arc::new(HttpStorefront::new(settings.api_url)),
        Box::new(FileSessionStore::new(settings.session_file)),
        ControllerOptions {
            auto_logout_on_auth_error: settings.auto_logout_on_auth_error,
        },
    );

    let report = orchestration::dispatch(&mut controller, &args.command).await;
    for line in &report.lines {
        println!("{line}");
    }

    Ok(if report.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

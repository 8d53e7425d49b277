//! PodcaX: record or pick an audio clip, preview and tweak it, and post it
//! with a cover image and a description, driven from the terminal.

mod app;
mod app_command;
mod command_reader;
mod config;
mod error;
mod notice;
mod platform;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    command_reader::CommandReader,
    error::{AppError, Result as AppResult},
    notice::Notice,
};

use crate::{
    config::Config,
    platform::{CpalPlayer, CpalRecorder, FsStorage, OutboxUploader},
};

use std::{sync::Arc, time::Duration};

use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application entry point.
fn main() {
    // Logs go to stderr so they never interleave with command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("podcax=debug,podcax_core=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Config validation failed: {:?}", e);
        std::process::exit(1);
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    rt.block_on(async {
        let reader = CommandReader::new(command_tx);

        let app = App::new(
            config.clone(),
            Arc::new(FsStorage),
            Arc::new(CpalRecorder::new(config.media_dir())),
            Arc::new(CpalPlayer::new(config.tick_interval())),
            Arc::new(OutboxUploader::new(config.outbox.dir.clone())),
            command_rx,
            shutdown_tx,
        );

        tokio::join!(
            async {
                if let Err(e) = reader.run_stdin(shutdown_rx).await {
                    error!(error = ?e, "Command reader error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });

    // Stdin reads run on a blocking thread that cannot be interrupted.
    rt.shutdown_timeout(Duration::from_millis(500));
    info!("Goodbye");
}

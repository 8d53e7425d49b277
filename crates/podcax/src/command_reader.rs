//! Line-based command input.
//!
//! Reads commands from an async line source (stdin in the binary), parses
//! them into [`AppCommand`]s and forwards them to the main application.
//! End of input is turned into a `Quit` command.

use crate::{AppCommand, AppError, AppResult, Notice};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument, warn};

/// Forwards parsed input lines to the application.
pub struct CommandReader {
    command_tx: mpsc::Sender<AppCommand>,
}

impl CommandReader {
    /// Reader sending into `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Read commands from stdin until EOF or shutdown.
    pub async fn run_stdin(&self, shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        self.run(BufReader::new(tokio::io::stdin()), shutdown_rx)
            .await
    }

    /// Read commands from `input` until EOF or shutdown.
    ///
    /// Unparseable lines are reported to the user and skipped.
    #[instrument(skip(self, input, shutdown_rx))]
    pub async fn run<R>(&self, input: R, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Command reader shutting down");
                    break;
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) if line.trim().is_empty() => continue,
                        Some(line) => match line.parse::<AppCommand>() {
                            Ok(command) => {
                                let quit = command == AppCommand::Quit;
                                self.send(command).await?;
                                if quit {
                                    break;
                                }
                            }
                            Err(e) => {
                                debug!(error = %e, "Rejected input line");
                                Notice::from(&e).show();
                            }
                        },
                        None => {
                            info!("End of input, requesting shutdown");
                            self.send(AppCommand::Quit).await?;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx.send(command).await.map_err(|e| {
            warn!("Application stopped receiving commands");
            AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", e.0, e),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}

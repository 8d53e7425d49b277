use crate::AppError;

use std::{panic::Location, path::PathBuf, str::FromStr};

use error_location::ErrorLocation;

/// Commands typed on stdin and dispatched by the main application.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Start a new microphone capture.
    Record,
    /// Stop the capture and select the recording.
    Stop,
    /// Select an audio file from disk.
    PickAudio {
        /// File to select.
        path: PathBuf,
    },
    /// Select a cover image from disk.
    PickImage {
        /// File to select.
        path: PathBuf,
    },
    /// Play/pause the preview, or the editor while it is open.
    Toggle,
    /// Move the play head.
    Seek {
        /// Target position; clamped by the session.
        millis: i64,
    },
    /// Remove the selected audio.
    Delete,
    /// Open the audio editor.
    Edit,
    /// Editor volume slider.
    Volume {
        /// New volume.
        value: f32,
    },
    /// Editor speed slider.
    Speed {
        /// New rate.
        value: f32,
    },
    /// Commit the editor.
    Save,
    /// Discard the editor.
    Cancel,
    /// Replace the post description.
    Describe {
        /// Description text, possibly empty.
        text: String,
    },
    /// Submit the post.
    Submit,
    /// Print the preview and draft state.
    Status,
    /// Print the command list.
    Help,
    /// Request application shutdown.
    Quit,
}

impl AppCommand {
    /// One line per command, for `help`.
    pub const USAGE: &'static str = "\
record | stop
pick-audio <path> | pick-image <path>
play | seek <ms> | delete
edit | volume <0..1> | speed <0.5..2> | save | cancel
describe <text> | submit
status | help | quit";
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        // `raw` keeps everything after the first separator; only `describe` uses it.
        let (verb, raw) = match input.trim_start().split_once(char::is_whitespace) {
            Some((verb, raw)) => (verb, raw),
            None => (trimmed, ""),
        };
        let rest = raw.trim();

        let invalid = |reason: &str| AppError::InvalidCommand {
            input: trimmed.to_string(),
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "record" => AppCommand::Record,
            "stop" => AppCommand::Stop,
            "pick-audio" | "pick-image" if rest.is_empty() => {
                return Err(invalid("expected a file path"));
            }
            "pick-audio" => AppCommand::PickAudio {
                path: PathBuf::from(rest),
            },
            "pick-image" => AppCommand::PickImage {
                path: PathBuf::from(rest),
            },
            "play" | "pause" | "toggle" => AppCommand::Toggle,
            "seek" => AppCommand::Seek {
                millis: rest
                    .parse()
                    .map_err(|_| invalid("expected a position in milliseconds"))?,
            },
            "delete" => AppCommand::Delete,
            "edit" => AppCommand::Edit,
            "volume" => AppCommand::Volume {
                value: rest.parse().map_err(|_| invalid("expected a number"))?,
            },
            "speed" => AppCommand::Speed {
                value: rest.parse().map_err(|_| invalid("expected a number"))?,
            },
            "save" => AppCommand::Save,
            "cancel" => AppCommand::Cancel,
            "describe" => AppCommand::Describe {
                text: raw.to_string(),
            },
            "submit" => AppCommand::Submit,
            "status" => AppCommand::Status,
            "help" | "?" => AppCommand::Help,
            "quit" | "exit" => AppCommand::Quit,
            "" => return Err(invalid("empty input")),
            _ => return Err(invalid("unknown command")),
        };

        Ok(command)
    }
}

use crate::{
    AppCommand, AppError, AppResult, Notice,
    config::Config,
    notice::preview_line,
    platform::PathPicker,
};

use std::{panic::Location, path::PathBuf, sync::Arc};

use error_location::ErrorLocation;
use podcax_core::{
    DraftAssembler, EditSession, MediaKind, MediaStore, PickOutcome, PickerCapability,
    PlaybackCapability, PlaybackStatus, PreviewState, RecordingCapability, RecordingSession,
    StorageCapability, SubmitOutcome, UploadCapability,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Whether the event loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Main application state.
///
/// Owns the media store, the draft and the optional editor, and is the only
/// task that touches them. Commands arrive on `command_rx`; playback status
/// ticks are pulled from whichever session is active.
pub struct App {
    pub(crate) config: Config,
    pub(crate) store: MediaStore,
    pub(crate) draft: DraftAssembler,
    pub(crate) editor: Option<EditSession>,
    pub(crate) recorder: Arc<dyn RecordingCapability>,
    pub(crate) player: Arc<dyn PlaybackCapability>,
    pub(crate) uploader: Arc<dyn UploadCapability>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) last_shown_second: Option<u64>,
}

impl App {
    /// Wire the store and draft from `config` around the given capabilities.
    pub(crate) fn new(
        config: Config,
        storage: Arc<dyn StorageCapability>,
        recorder: Arc<dyn RecordingCapability>,
        player: Arc<dyn PlaybackCapability>,
        uploader: Arc<dyn UploadCapability>,
        command_rx: mpsc::Receiver<AppCommand>,
        shutdown_tx: watch::Sender<bool>,
    ) -> Self {
        let store = MediaStore::new(storage, config.private_root());
        let draft = DraftAssembler::new(config.draft.clear_policy);

        Self {
            config,
            store,
            draft,
            editor: None,
            recorder,
            player,
            uploader,
            command_rx,
            shutdown_tx,
            last_shown_second: None,
        }
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("PodcaX starting");
        Notice::new("PodcaX", "Type `help` for commands.").show();

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        info!("Command channel closed, shutting down");
                        break;
                    };
                    match self.handle(command).await {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::Quit) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Err(e) => {
                            warn!(error = %e, "Command failed");
                            Notice::from(&e).show();
                        }
                    }
                }

                Some(status) = next_status(&mut self.editor, &mut self.store) => {
                    self.on_status(status);
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Release every session and signal the other tasks.
    pub(crate) async fn shutdown(&mut self) {
        self.close_editor().await;
        self.store.close().await;
        let _ = self.shutdown_tx.send(true);
        info!("PodcaX shut down successfully");
    }

    /// Apply one command.
    #[instrument(skip(self))]
    pub(crate) async fn handle(&mut self, command: AppCommand) -> AppResult<Flow> {
        match command {
            AppCommand::Record => {
                let session = RecordingSession::new(
                    Arc::clone(&self.recorder),
                    self.config.capture_options(),
                );
                self.store.start_recording(session).await?;
                Notice::new("Recording", "Recording... type `stop` to finish.").show();
            }
            AppCommand::Stop => {
                let handle = self.store.stop_recording().await?;
                self.close_editor().await;
                Notice::new("Recorded", handle.display_name()).show();
                self.store.set_audio_handle(Some(handle)).await;
            }
            AppCommand::PickAudio { path } => self.pick(MediaKind::Audio, path).await?,
            AppCommand::PickImage { path } => self.pick(MediaKind::Image, path).await?,
            AppCommand::Toggle => {
                match &mut self.editor {
                    Some(editor) => editor.toggle_playback().await?,
                    None => self.store.toggle_preview(Arc::clone(&self.player)).await?,
                }
                self.last_shown_second = None;
                println!("{}", preview_line(&self.current_preview()));
            }
            AppCommand::Seek { millis } => {
                match &mut self.editor {
                    Some(editor) => editor.playback_mut().seek(millis).await?,
                    None => self.store.seek_preview(millis).await?,
                }
                println!("{}", preview_line(&self.current_preview()));
            }
            AppCommand::Delete => {
                self.close_editor().await;
                match self.store.delete_audio_handle().await {
                    Some(handle) => Notice::new("Deleted", handle.display_name()).show(),
                    None => debug!("Nothing to delete"),
                }
            }
            AppCommand::Edit => {
                if self.editor.is_some() {
                    Notice::new("Editor", "The editor is already open.").show();
                } else {
                    let editor =
                        EditSession::open(&mut self.store, Arc::clone(&self.player)).await?;
                    Notice::new(
                        "Editor",
                        format!(
                            "Editing {}. Use volume, speed, play, save or cancel.",
                            editor.target().display_name()
                        ),
                    )
                    .show();
                    self.editor = Some(editor);
                }
            }
            AppCommand::Volume { value } => {
                let editor = self.editor_mut("volume")?;
                editor.adjust_volume(value).await?;
                let volume = editor.volume();
                Notice::new("Editor", format!("Volume {:.2}", volume)).show();
            }
            AppCommand::Speed { value } => {
                let editor = self.editor_mut("speed")?;
                editor.adjust_speed(value).await?;
                let rate = editor.rate();
                Notice::new("Editor", format!("Speed {:.2}x", rate)).show();
            }
            AppCommand::Save => {
                let editor = self.take_editor("save")?;
                let handle = editor.save(&mut self.store).await?;
                Notice::new("Saved", handle.display_name()).show();
            }
            AppCommand::Cancel => {
                let editor = self.take_editor("cancel")?;
                editor.cancel().await;
                Notice::new("Editor", "Changes discarded.").show();
            }
            AppCommand::Describe { text } => {
                self.draft.set_description(&text);
                debug!(chars = self.draft.description().chars().count(), "Description set");
            }
            AppCommand::Submit => self.submit().await,
            AppCommand::Status => self.print_status(),
            AppCommand::Help => println!("{}", AppCommand::USAGE),
            AppCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    async fn pick(&mut self, kind: MediaKind, path: PathBuf) -> AppResult<()> {
        let picker = PathPicker::new(path);
        let outcome = match kind {
            MediaKind::Audio => picker.pick_audio().await?,
            MediaKind::Image => picker.pick_image().await?,
        };

        if kind == MediaKind::Audio && matches!(outcome, PickOutcome::Picked(_)) {
            self.close_editor().await;
        }

        match self.store.select_picked(kind, outcome).await? {
            Some(handle) => Notice::new("Selected", handle.display_name()).show(),
            None => Notice::new("Picker", "Nothing selected.").show(),
        }
        Ok(())
    }

    async fn submit(&mut self) {
        self.close_editor().await;

        match self
            .draft
            .submit(&mut self.store, self.uploader.as_ref())
            .await
        {
            SubmitOutcome::Incomplete(incomplete) => Notice::from(&incomplete).show(),
            SubmitOutcome::Submitted(_) => Notice::new("Shared", "Post submitted.").show(),
            SubmitOutcome::UploadFailed { error, cleared, .. } => {
                Notice::from(&error).show();
                if !cleared {
                    Notice::new("Draft", "Your draft was kept; try `submit` again.").show();
                }
            }
        }
    }

    fn on_status(&mut self, status: PlaybackStatus) {
        if status.did_just_finish {
            self.last_shown_second = None;
            Notice::new("Playback", "Finished.").show();
            return;
        }

        let second = status.position_millis / 1000;
        if status.is_playing && self.last_shown_second != Some(second) {
            self.last_shown_second = Some(second);
            println!("{}", preview_line(&self.current_preview()));
        }
    }

    /// Preview of the editor while it is open, else of the store.
    pub(crate) fn current_preview(&self) -> PreviewState {
        match &self.editor {
            Some(editor) => {
                let session = editor.playback();
                PreviewState {
                    display_name: Some(editor.target().display_name().to_string()),
                    position_millis: session.position_millis(),
                    duration_millis: session.duration_millis(),
                    is_playing: session.is_playing(),
                }
            }
            None => self.store.preview(),
        }
    }

    fn print_status(&self) {
        println!("{}", preview_line(&self.current_preview()));
        println!(
            "image: {}",
            self.store
                .image_handle()
                .map(|h| h.display_name())
                .unwrap_or("(none)")
        );
        println!("description: {} chars", self.draft.description().chars().count());
        println!(
            "recording: {}",
            if self.store.is_recording() { "yes" } else { "no" }
        );
        match self.draft.draft(&self.store).to_submission() {
            Ok(_) => println!("ready to submit"),
            Err(incomplete) => println!("{}", incomplete.message()),
        }
    }

    async fn close_editor(&mut self) {
        if let Some(editor) = self.editor.take() {
            editor.cancel().await;
        }
    }

    #[track_caller]
    fn editor_mut(&mut self, command: &str) -> AppResult<&mut EditSession> {
        self.editor.as_mut().ok_or_else(|| no_editor(command))
    }

    #[track_caller]
    fn take_editor(&mut self, command: &str) -> AppResult<EditSession> {
        self.editor.take().ok_or_else(|| no_editor(command))
    }
}

#[track_caller]
fn no_editor(command: &str) -> AppError {
    AppError::InvalidCommand {
        input: command.to_string(),
        reason: "open the editor with `edit` first".to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Next status tick of the editor's session, else of the store's preview
/// session. Pends forever when nothing is loaded.
async fn next_status(
    editor: &mut Option<EditSession>,
    store: &mut MediaStore,
) -> Option<PlaybackStatus> {
    match editor {
        Some(editor) => editor.playback_mut().next_status().await,
        None => match store.playback_mut() {
            Some(session) => session.next_status().await,
            None => std::future::pending().await,
        },
    }
}

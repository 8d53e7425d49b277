//! PodcaX Core Library
//!
//! Local media session lifecycle for the PodcaX post composer: record or
//! pick audio, preview it, tweak volume and speed in the editor, and
//! assemble a post from audio, cover image and description.
//!
//! Platform services (recorder, player, picker, storage, upload) are
//! injected as capability trait objects, see [`capability`].
//!
//! # Example
//!
//! ```no_run
//! use podcax_core::{
//!     CaptureOptions, CoreResult, MediaStore, PlaybackCapability, RecordingCapability,
//!     RecordingSession, StorageCapability,
//! };
//!
//! use std::sync::Arc;
//!
//! async fn record_and_play(
//!     storage: Arc<dyn StorageCapability>,
//!     recorder: Arc<dyn RecordingCapability>,
//!     player: Arc<dyn PlaybackCapability>,
//! ) -> CoreResult<()> {
//!     let mut store = MediaStore::new(storage, "/data/podcax/media");
//!
//!     let session = RecordingSession::new(recorder, CaptureOptions::default());
//!     store.start_recording(session).await?;
//!     let handle = store.stop_recording().await?;
//!
//!     store.set_audio_handle(Some(handle)).await;
//!     store.toggle_preview(player).await?;
//!
//!     store.close().await;
//!     Ok(())
//! }
//! ```

pub mod capability;
mod draft;
mod edit;
mod error;
mod media;
mod playback;
mod recording;

pub use {
    capability::{
        CaptureHandle, CaptureOptions, LoadOptions, LoadedSound, Permission, PickOutcome,
        PickedFile, PickerCapability, PlaybackCapability, PostSubmission, RecordingCapability,
        Sound, StorageCapability, UploadCapability,
    },
    draft::{
        ClearPolicy, DraftAssembler, DraftField, IncompleteDraft, MAX_DESCRIPTION_CHARS,
        PostDraft, SubmitOutcome,
    },
    edit::{EditSession, edited_name},
    error::{MediaError, PlatformError, Result as CoreResult},
    media::{EditParams, MediaHandle, MediaId, MediaKind, MediaStore, MediaUri, PreviewState},
    playback::{
        Epoch, MAX_RATE, MAX_VOLUME, MIN_RATE, MIN_VOLUME, PlaybackSession, PlaybackState,
        PlaybackStatus, StatusSink, StatusTick, format_millis,
    },
    recording::{RecordingSession, RecordingState},
};

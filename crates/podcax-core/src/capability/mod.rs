//! Platform services the sessions depend on.
//!
//! Each capability is an object-safe async trait so hosts can inject a real
//! platform implementation and tests can inject a double.

mod picker;
mod playback;
mod recording;
mod storage;
mod upload;

pub use {
    picker::{PickOutcome, PickedFile, PickerCapability},
    playback::{LoadOptions, LoadedSound, PlaybackCapability, Sound},
    recording::{CaptureHandle, CaptureOptions, Permission, RecordingCapability},
    storage::StorageCapability,
    upload::{PostSubmission, UploadCapability},
};

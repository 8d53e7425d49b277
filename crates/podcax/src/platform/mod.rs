//! Host implementations of the podcax-core capabilities.

mod picker;
mod player;
mod recorder;
mod storage;
mod upload;

pub(crate) use {
    picker::PathPicker, player::CpalPlayer, recorder::CpalRecorder, storage::FsStorage,
    upload::OutboxUploader,
};

#[cfg(test)]
pub(crate) use {
    player::{DecodedAudio, Playhead, decode_wav},
    recorder::write_wav,
    upload::PostManifest,
};

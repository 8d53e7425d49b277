mod format;
mod session;
mod state;
mod status;

pub use {
    format::format_millis,
    session::{MAX_RATE, MAX_VOLUME, MIN_RATE, MIN_VOLUME, PlaybackSession},
    state::PlaybackState,
    status::{Epoch, PlaybackStatus, StatusSink, StatusTick},
};

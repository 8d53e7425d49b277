mod session;
mod state;

pub use {session::RecordingSession, state::RecordingState};

use crate::{
    LoadOptions, MediaError, MediaUri, PlaybackCapability, PlaybackSession, PlaybackState,
    PlaybackStatus,
    tests::fakes::{DURATION_MS, FakePlayer, PRIVATE_ROOT},
};

use std::sync::Arc;

fn uri() -> MediaUri {
    MediaUri::new(format!("{}/song.mp3", PRIVATE_ROOT))
}

async fn loaded_session(player: &Arc<FakePlayer>) -> PlaybackSession {
    let capability: Arc<dyn PlaybackCapability> = player.clone();
    let mut session = PlaybackSession::new(capability);
    let result = session.load(&uri(), LoadOptions::default()).await;
    assert!(result.is_ok());
    session
}

/// WHAT: Loading moves Unloaded to Loaded with the platform duration
/// WHY: The preview needs duration before the first tick arrives
#[tokio::test]
async fn given_unloaded_session_when_loading_then_loaded_with_duration() {
    // Given: A fresh session
    let player = Arc::new(FakePlayer::new());

    // When: Loading a sound
    let mut session = loaded_session(&player).await;

    // Then: Loaded, paused at 0, duration known
    assert_eq!(session.state(), PlaybackState::Loaded);
    assert_eq!(session.position_millis(), 0);
    assert_eq!(session.duration_millis(), DURATION_MS);
    assert!(!session.is_playing());

    session.unload().await;
}

/// WHAT: A failed load leaves the session in Error and can be retried
/// WHY: Error must be a safe state that accepts a reload
#[tokio::test]
async fn given_unreadable_resource_when_loading_then_error_state_and_reload_allowed() {
    // Given: A player that cannot open the resource
    let mut failing = FakePlayer::new();
    failing.fail_load = true;
    let capability: Arc<dyn PlaybackCapability> = Arc::new(failing);
    let mut session = PlaybackSession::new(capability);

    // When: Loading
    let result = session.load(&uri(), LoadOptions::default()).await;

    // Then: LoadError and Error state
    assert!(matches!(result, Err(MediaError::LoadError { .. })));
    assert_eq!(session.state(), PlaybackState::Error);

    // And: Reset returns to Unloaded
    assert!(session.reset().await.is_ok());
    assert_eq!(session.state(), PlaybackState::Unloaded);
}

/// WHAT: Loading twice without unloading is rejected
/// WHY: A session owns exactly one platform sound
#[tokio::test]
async fn given_loaded_session_when_loading_again_then_invalid_state() {
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;

    let result = session.load(&uri(), LoadOptions::default()).await;

    assert!(matches!(
        result,
        Err(MediaError::InvalidState {
            operation: "load",
            state: PlaybackState::Loaded,
            ..
        })
    ));
    assert_eq!(player.log.count("load:1"), 1);
    session.unload().await;
}

/// WHAT: play() while Playing is a no-op
/// WHY: Double taps on the play button must not error or restart
#[tokio::test]
async fn given_playing_session_when_play_again_then_noop() {
    // Given: A playing session
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;
    assert!(session.play().await.is_ok());

    // When: Playing again
    let result = session.play().await;

    // Then: Ok, still Playing, platform called once
    assert!(result.is_ok());
    assert_eq!(session.state(), PlaybackState::Playing);
    assert_eq!(player.log.count("play:1"), 1);

    session.unload().await;
}

/// WHAT: pause() is only valid while Playing
/// WHY: Pausing a stopped sound is a caller bug, reported not ignored
#[tokio::test]
async fn given_loaded_session_when_pausing_then_invalid_state() {
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;

    let result = session.pause().await;

    assert!(matches!(result, Err(MediaError::InvalidState { .. })));
    assert_eq!(session.state(), PlaybackState::Loaded);

    // Play then pause works
    assert!(session.play().await.is_ok());
    assert!(session.pause().await.is_ok());
    assert_eq!(session.state(), PlaybackState::Paused);

    session.unload().await;
}

/// WHAT: Volume and rate changes never toggle play state
/// WHY: Slider moves must not start or stop audio
#[tokio::test]
async fn given_loaded_or_playing_session_when_setting_volume_and_rate_then_state_unchanged() {
    // Given: A loaded session
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;

    // When/Then: Changing both while Loaded
    assert!(session.set_volume(0.25).await.is_ok());
    assert!(session.set_rate(1.5).await.is_ok());
    assert_eq!(session.state(), PlaybackState::Loaded);

    // When/Then: Changing both while Playing
    assert!(session.play().await.is_ok());
    assert!(session.set_volume(0.75).await.is_ok());
    assert!(session.set_rate(0.5).await.is_ok());
    assert_eq!(session.state(), PlaybackState::Playing);

    assert!((session.volume() - 0.75).abs() < f32::EPSILON);
    assert!((session.rate() - 0.5).abs() < f32::EPSILON);
    assert!(player.log.position("rate:1:0.5").is_some());

    session.unload().await;
}

/// WHAT: Out-of-range volume and rate are clamped, NaN rejected
/// WHY: Platform players misbehave outside [0,1] and [0.5,2]
#[tokio::test]
async fn given_out_of_range_values_when_setting_then_clamped() {
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;

    assert!(session.set_volume(1.7).await.is_ok());
    assert!(session.set_rate(0.1).await.is_ok());
    assert!((session.volume() - 1.0).abs() < f32::EPSILON);
    assert!((session.rate() - 0.5).abs() < f32::EPSILON);

    assert!(session.set_volume(-3.0).await.is_ok());
    assert!(session.set_rate(9.0).await.is_ok());
    assert!(session.volume().abs() < f32::EPSILON);
    assert!((session.rate() - 2.0).abs() < f32::EPSILON);

    let result = session.set_volume(f32::NAN).await;
    assert!(matches!(result, Err(MediaError::InvalidParameter { .. })));

    session.unload().await;
}

/// WHAT: Volume changes need a loaded sound
/// WHY: Nothing to forward the value to while Unloaded
#[tokio::test]
async fn given_unloaded_session_when_setting_volume_then_invalid_state() {
    let capability: Arc<dyn PlaybackCapability> = Arc::new(FakePlayer::new());
    let mut session = PlaybackSession::new(capability);

    let result = session.set_volume(0.5).await;

    assert!(matches!(
        result,
        Err(MediaError::InvalidState {
            state: PlaybackState::Unloaded,
            ..
        })
    ));
}

/// WHAT: seek() clamps to [0, duration] and is idempotent
/// WHY: Scrubbing past either end must land on the boundary
#[tokio::test]
async fn given_ten_second_sound_when_seeking_out_of_range_then_clamped() {
    // Given: A 10 s sound
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;

    // When/Then: Before the start
    assert!(session.seek(-50).await.is_ok());
    assert_eq!(session.position_millis(), 0);

    // When/Then: Past the end, twice
    assert!(session.seek(99_999).await.is_ok());
    assert_eq!(session.position_millis(), 10_000);
    assert!(session.seek(99_999).await.is_ok());
    assert_eq!(session.position_millis(), 10_000);

    // Then: State untouched
    assert_eq!(session.state(), PlaybackState::Loaded);

    session.unload().await;
}

/// WHAT: seek() keeps a paused session paused
/// WHY: Scrubbing is not a play/pause action
#[tokio::test]
async fn given_paused_session_when_seeking_then_still_paused() {
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;
    assert!(session.play().await.is_ok());
    assert!(session.pause().await.is_ok());

    assert!(session.seek(4_200).await.is_ok());

    assert_eq!(session.state(), PlaybackState::Paused);
    assert_eq!(session.position_millis(), 4_200);
    assert!(player.log.position("seek:1:4200").is_some());

    session.unload().await;
}

/// WHAT: Status ticks advance the position while playing
/// WHY: The session is the single writer of platform-reported state
#[tokio::test]
async fn given_playing_session_when_ticks_arrive_then_position_follows() {
    // Given: A playing session
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;
    assert!(session.play().await.is_ok());
    let sink = player.last_sink();
    assert!(sink.is_some());
    let Some(sink) = sink else { return };

    // When: Two ticks are pushed
    assert!(sink.push(PlaybackStatus::loaded(1_500, DURATION_MS, true)));
    assert!(sink.push(PlaybackStatus::loaded(2_500, DURATION_MS, true)));
    let applied = session.drain_status().await;

    // Then: Both applied, position follows the latest
    assert_eq!(applied, 2);
    assert_eq!(session.position_millis(), 2_500);
    assert_eq!(session.state(), PlaybackState::Playing);

    session.unload().await;
}

/// WHAT: Ticks from a previous load are dropped
/// WHY: A tick racing an unload must never write into the next load
#[tokio::test]
#[allow(clippy::panic)]
async fn given_reloaded_session_when_stale_tick_arrives_then_dropped() {
    // Given: A session loaded, unloaded and loaded again
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;
    session.unload().await;
    assert!(session.load(&uri(), LoadOptions::default()).await.is_ok());
    let (Some(old_sink), Some(new_sink)) = (player.sink(1), player.sink(2)) else {
        panic!("expected two sinks");
    };
    assert_ne!(old_sink.epoch(), new_sink.epoch());

    // When: The first load's sink pushes a tick
    old_sink.push(PlaybackStatus::loaded(7_000, DURATION_MS, true));
    let applied = session.drain_status().await;

    // Then: Nothing applied
    assert_eq!(applied, 0);
    assert_eq!(session.position_millis(), 0);

    // And: The current sink still works
    new_sink.push(PlaybackStatus::loaded(300, DURATION_MS, false));
    assert_eq!(session.drain_status().await, 1);
    assert_eq!(session.position_millis(), 300);

    session.unload().await;
}

/// WHAT: No tick is applied after unload
/// WHY: Unload invalidates the epoch before releasing the sound
#[tokio::test]
#[allow(clippy::panic)]
async fn given_unloaded_session_when_tick_arrives_then_ignored() {
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;
    let Some(sink) = player.last_sink() else {
        panic!("expected a sink");
    };

    session.unload().await;
    sink.push(PlaybackStatus::loaded(5_000, DURATION_MS, true));

    assert_eq!(session.drain_status().await, 0);
    assert_eq!(session.state(), PlaybackState::Unloaded);
    assert_eq!(session.position_millis(), 0);
    assert_eq!(session.duration_millis(), 0);
}

/// WHAT: Natural completion moves Playing to Finished and rewinds
/// WHY: The next play must start from the beginning
#[tokio::test]
#[allow(clippy::panic)]
async fn given_playing_session_when_finish_tick_arrives_then_finished_at_zero() {
    // Given: A playing session
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;
    assert!(session.play().await.is_ok());
    let Some(sink) = player.last_sink() else {
        panic!("expected a sink");
    };

    // When: The platform reports completion
    sink.push(PlaybackStatus::finished(DURATION_MS));
    assert_eq!(session.drain_status().await, 1);

    // Then: Finished at 0, platform rewound and stopped
    assert_eq!(session.state(), PlaybackState::Finished);
    assert_eq!(session.position_millis(), 0);
    assert!(player.log.position("seek:1:0").is_some());
    assert!(player.log.position("stop:1").is_some());

    // And: play() needs a reset first
    assert!(matches!(
        session.play().await,
        Err(MediaError::InvalidState { .. })
    ));
    assert!(session.reset().await.is_ok());
    assert_eq!(session.state(), PlaybackState::Loaded);
    assert!(session.play().await.is_ok());

    session.unload().await;
}

/// WHAT: A platform failure during play moves the session to Error
/// WHY: The session must end in a well-defined state after a fault
#[tokio::test]
async fn given_failing_platform_when_playing_then_error_state() {
    let mut failing = FakePlayer::new();
    failing.fail_play = true;
    let player = Arc::new(failing);
    let mut session = loaded_session(&player).await;

    let result = session.play().await;

    assert!(matches!(result, Err(MediaError::PlaybackError { .. })));
    assert_eq!(session.state(), PlaybackState::Error);

    // Unload still releases the platform sound
    session.unload().await;
    assert_eq!(session.state(), PlaybackState::Unloaded);
    assert!(player.log.position("unload:1").is_some());
}

/// WHAT: A tick reporting the sound as unloaded moves the session to Error
/// WHY: The platform can drop a sound on its own (device change, interruption)
#[tokio::test]
#[allow(clippy::panic)]
async fn given_loaded_session_when_platform_reports_unloaded_then_error() {
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;
    let Some(sink) = player.last_sink() else {
        panic!("expected a sink");
    };

    sink.push(PlaybackStatus::unloaded());
    assert_eq!(session.drain_status().await, 1);

    assert_eq!(session.state(), PlaybackState::Error);
    session.unload().await;
}

/// WHAT: stop() rewinds and returns to Loaded
/// WHY: Stopping is distinct from pausing
#[tokio::test]
async fn given_playing_session_when_stopping_then_loaded_at_zero() {
    let player = Arc::new(FakePlayer::new());
    let mut session = loaded_session(&player).await;
    assert!(session.play().await.is_ok());
    assert!(session.seek(3_000).await.is_ok());

    assert!(session.stop().await.is_ok());

    assert_eq!(session.state(), PlaybackState::Loaded);
    assert_eq!(session.position_millis(), 0);
    session.unload().await;
}

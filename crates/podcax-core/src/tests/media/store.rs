use crate::{
    CaptureOptions, LoadOptions, MediaError, MediaHandle, MediaKind, MediaStore, MediaUri,
    PickOutcome, PickedFile, PlaybackCapability, PlaybackState, PlaybackStatus, PreviewState,
    RecordingCapability, RecordingSession, RecordingState, StorageCapability,
    tests::fakes::{DURATION_MS, FakePlayer, FakeRecorder, FakeStorage, PRIVATE_ROOT},
};

use std::{sync::Arc, time::Duration};

fn store_with(storage: &Arc<FakeStorage>) -> MediaStore {
    let capability: Arc<dyn StorageCapability> = storage.clone();
    MediaStore::new(capability, PRIVATE_ROOT)
}

fn private_song() -> MediaHandle {
    MediaHandle::audio(format!("{}/song.mp3", PRIVATE_ROOT), "song.mp3")
}

fn library_song() -> MediaHandle {
    MediaHandle::audio("content://media/external/audio/42", "library.mp3")
}

/// WHAT: Deleting an app-owned audio removes the file and clears preview
/// WHY: Recordings live in private storage and must not leak
#[tokio::test]
async fn given_private_audio_when_deleting_then_resource_removed_and_preview_cleared() {
    // Given: A private song being previewed
    let storage = Arc::new(FakeStorage::default());
    let player = Arc::new(FakePlayer::new());
    let mut store = store_with(&storage);
    store.set_audio_handle(Some(private_song())).await;
    assert!(store.toggle_preview(player.clone()).await.is_ok());

    // When: Deleting
    let deleted = store.delete_audio_handle().await;

    // Then: Handle gone, session unloaded, file removed
    assert!(deleted.is_some());
    assert!(store.audio_handle().is_none());
    assert!(store.playback().is_none());
    assert!(player.log.position("unload:1").is_some());
    assert_eq!(storage.deleted(), vec![format!("{}/song.mp3", PRIVATE_ROOT)]);
    assert_eq!(store.preview(), PreviewState::default());
}

/// WHAT: Deleting a library audio only drops the reference
/// WHY: The app must never delete files it does not own
#[tokio::test]
async fn given_library_audio_when_deleting_then_resource_kept() {
    let storage = Arc::new(FakeStorage::default());
    let mut store = store_with(&storage);
    store.set_audio_handle(Some(library_song())).await;

    let deleted = store.delete_audio_handle().await;

    assert!(deleted.is_some());
    assert!(store.audio_handle().is_none());
    assert!(storage.deleted().is_empty());
}

/// WHAT: A file in a sibling directory sharing the private root's prefix is kept
/// WHY: `<root>-backup/` is user storage, not app storage
#[tokio::test]
async fn given_sibling_prefix_audio_when_deleting_then_resource_kept() {
    // Given: A song next to the private root whose path starts with the same text
    let storage = Arc::new(FakeStorage::default());
    let mut store = store_with(&storage);
    let sibling = MediaHandle::audio(
        format!("{}-backup/user-song.mp3", PRIVATE_ROOT),
        "user-song.mp3",
    );
    store.set_audio_handle(Some(sibling)).await;

    // When: Deleting
    let deleted = store.delete_audio_handle().await;

    // Then: Handle dropped, file untouched
    assert!(deleted.is_some());
    assert!(store.audio_handle().is_none());
    assert!(storage.deleted().is_empty());
}

/// WHAT: Locators match the private root on whole path components
/// WHY: Only files inside the root are app-owned
#[test]
fn given_locators_when_checking_root_then_component_boundaries_respected() {
    let root = "/data/podcax/media";

    assert!(MediaUri::new("/data/podcax/media/capture.wav").is_within(root));
    assert!(MediaUri::new("/data/podcax/media").is_within(root));
    assert!(MediaUri::new("/data/podcax/media/x.wav").is_within("/data/podcax/media/"));
    assert!(MediaUri::new(r"C:\podcax\media\x.wav").is_within(r"C:\podcax\media"));
    assert!(!MediaUri::new("/data/podcax/media2/x.wav").is_within(root));
    assert!(!MediaUri::new("/data/podcax/media-backup/x.wav").is_within(root));
    assert!(!MediaUri::new("/data/podcax/media/x.wav").is_within(""));
}

/// WHAT: A failed storage delete still clears the handle
/// WHY: The user asked for the audio to go away; a stray file is logged
#[tokio::test]
async fn given_failing_storage_when_deleting_then_handle_cleared() {
    let storage = Arc::new(FakeStorage::failing());
    let mut store = store_with(&storage);
    store.set_audio_handle(Some(private_song())).await;

    let deleted = store.delete_audio_handle().await;

    assert!(deleted.is_some());
    assert!(store.audio_handle().is_none());
}

/// WHAT: Deleting with nothing selected is a no-op
/// WHY: The delete button can be pressed twice
#[tokio::test]
async fn given_no_audio_when_deleting_then_none() {
    let storage = Arc::new(FakeStorage::default());
    let mut store = store_with(&storage);

    assert!(store.delete_audio_handle().await.is_none());
    assert!(storage.deleted().is_empty());
}

/// WHAT: Deleting while the preview is still loading leaves no session behind
/// WHY: An abandoned load must not resurrect playback after delete
#[tokio::test]
async fn given_loading_preview_when_deleting_then_session_released() {
    // Given: A player whose load never completes
    let storage = Arc::new(FakeStorage::default());
    let mut hanging = FakePlayer::new();
    hanging.hang_load = true;
    let player: Arc<dyn PlaybackCapability> = Arc::new(hanging);
    let mut store = store_with(&storage);
    store.set_audio_handle(Some(private_song())).await;

    // When: The load is abandoned mid-flight
    let attempt = tokio::time::timeout(
        Duration::from_millis(20),
        store.attach_playback(player, LoadOptions::default()),
    )
    .await;
    assert!(attempt.is_err());
    assert_eq!(
        store.playback().map(|s| s.state()),
        Some(PlaybackState::Loading)
    );

    // And: The audio is deleted
    assert!(store.delete_audio_handle().await.is_some());

    // Then: No session, empty preview
    assert!(store.playback().is_none());
    assert!(store.audio_handle().is_none());
    assert_eq!(store.preview().position_millis, 0);
}

/// WHAT: Re-attaching unloads the previous session before the next load
/// WHY: Two platform sounds must never coexist
#[tokio::test]
async fn given_attached_session_when_attaching_again_then_unload_precedes_load() {
    let storage = Arc::new(FakeStorage::default());
    let player = Arc::new(FakePlayer::new());
    let mut store = store_with(&storage);
    store.set_audio_handle(Some(private_song())).await;
    assert!(
        store
            .attach_playback(player.clone(), LoadOptions::default())
            .await
            .is_ok()
    );

    assert!(
        store
            .attach_playback(player.clone(), LoadOptions::default())
            .await
            .is_ok()
    );

    assert_eq!(player.log.events(), vec!["load:1", "unload:1", "load:2"]);
    store.close().await;
}

/// WHAT: Selecting a different audio unloads the old session
/// WHY: The preview must follow the selection
#[tokio::test]
async fn given_previewing_when_selecting_other_audio_then_old_session_unloaded() {
    let storage = Arc::new(FakeStorage::default());
    let player = Arc::new(FakePlayer::new());
    let mut store = store_with(&storage);
    store.set_audio_handle(Some(private_song())).await;
    assert!(store.toggle_preview(player.clone()).await.is_ok());

    store.set_audio_handle(Some(library_song())).await;

    assert!(store.playback().is_none());
    assert!(player.log.position("unload:1").is_some());
    assert_eq!(
        store.preview().display_name.as_deref(),
        Some("library.mp3")
    );
}

/// WHAT: A failed attach leaves no session attached
/// WHY: The next toggle must retry the load from scratch
#[tokio::test]
async fn given_failing_load_when_toggling_preview_then_load_error_and_detached() {
    let storage = Arc::new(FakeStorage::default());
    let mut failing = FakePlayer::new();
    failing.fail_load = true;
    let player: Arc<dyn PlaybackCapability> = Arc::new(failing);
    let mut store = store_with(&storage);
    store.set_audio_handle(Some(private_song())).await;

    let result = store.toggle_preview(player).await;

    assert!(matches!(result, Err(MediaError::LoadError { .. })));
    assert!(store.playback().is_none());
    assert!(store.audio_handle().is_some());
}

/// WHAT: Toggle without audio reports NoAudioSelected
/// WHY: The preview card has nothing to play
#[tokio::test]
async fn given_no_audio_when_toggling_then_no_audio_selected() {
    let storage = Arc::new(FakeStorage::default());
    let player: Arc<dyn PlaybackCapability> = Arc::new(FakePlayer::new());
    let mut store = store_with(&storage);

    let result = store.toggle_preview(player).await;

    assert!(matches!(result, Err(MediaError::NoAudioSelected { .. })));
}

/// WHAT: Picker results become handles, with fallback names
/// WHY: Some providers return no file name
#[tokio::test]
#[allow(clippy::panic)]
async fn given_picked_files_when_selecting_then_handles_named() {
    let storage = Arc::new(FakeStorage::default());
    let mut store = store_with(&storage);

    let audio = store
        .select_picked(
            MediaKind::Audio,
            PickOutcome::Picked(PickedFile {
                uri: "content://media/audio/7".into(),
                name: None,
            }),
        )
        .await;
    let image = store
        .select_picked(
            MediaKind::Image,
            PickOutcome::Picked(PickedFile {
                uri: "content://media/images/3".into(),
                name: Some("cover.png".to_string()),
            }),
        )
        .await;

    let (Ok(Some(audio)), Ok(Some(image))) = (audio, image) else {
        panic!("both picks should select a handle");
    };
    assert!(audio.display_name().starts_with("audio-"));
    assert!(audio.display_name().ends_with(".mp3"));
    assert_eq!(image.display_name(), "cover.png");
    assert_eq!(store.audio_handle(), Some(&audio));
    assert_eq!(store.image_handle(), Some(&image));
}

/// WHAT: Cancel keeps the selection, refusal reports the capability
/// WHY: Dismissing the picker is not an error
#[tokio::test]
#[allow(clippy::panic)]
async fn given_cancel_or_denied_when_selecting_then_selection_kept() {
    let storage = Arc::new(FakeStorage::default());
    let mut store = store_with(&storage);
    store.set_image_handle(Some(MediaHandle::image("content://img/1", "old.jpg")));

    let cancelled = store
        .select_picked(MediaKind::Image, PickOutcome::Cancelled)
        .await;
    let denied = store
        .select_picked(MediaKind::Image, PickOutcome::PermissionDenied)
        .await;

    assert!(matches!(cancelled, Ok(None)));
    let Err(error) = denied else {
        panic!("expected permission error");
    };
    assert!(matches!(
        error,
        MediaError::PermissionDenied {
            capability: "photos",
            ..
        }
    ));
    assert_eq!(error.user_notice().1, "Permission required for photos.");
    assert_eq!(
        store.image_handle().map(|h| h.display_name()),
        Some("old.jpg")
    );
}

/// WHAT: Replacing requires the same handle id
/// WHY: A stale editor must not overwrite a newer selection
#[tokio::test]
async fn given_other_handle_when_replacing_then_handle_replaced() {
    let storage = Arc::new(FakeStorage::default());
    let mut store = store_with(&storage);
    store.set_audio_handle(Some(private_song())).await;

    let result = store.replace_audio_handle(library_song()).await;

    assert!(matches!(result, Err(MediaError::HandleReplaced { .. })));
    assert_eq!(
        store.audio_handle().map(|h| h.display_name()),
        Some("song.mp3")
    );
}

/// WHAT: Only one capture may run at a time
/// WHY: The microphone is a single shared resource
#[tokio::test]
async fn given_recording_when_starting_another_then_recording_active() {
    let storage = Arc::new(FakeStorage::default());
    let recorder: Arc<dyn RecordingCapability> = Arc::new(FakeRecorder::new());
    let mut store = store_with(&storage);
    assert!(
        store
            .start_recording(RecordingSession::new(
                recorder.clone(),
                CaptureOptions::default()
            ))
            .await
            .is_ok()
    );

    let result = store
        .start_recording(RecordingSession::new(recorder, CaptureOptions::default()))
        .await;

    assert!(matches!(result, Err(MediaError::RecordingActive { .. })));
    assert!(store.is_recording());
    assert!(store.stop_recording().await.is_ok());
    assert!(!store.is_recording());
}

/// WHAT: Stop without a capture reports NotRecording
/// WHY: The stop button may race a failed start
#[tokio::test]
async fn given_no_recording_when_stopping_then_not_recording() {
    let storage = Arc::new(FakeStorage::default());
    let mut store = store_with(&storage);

    let result = store.stop_recording().await;

    assert!(matches!(result, Err(MediaError::NotRecording { .. })));
    assert_eq!(store.recording_state(), RecordingState::Idle);
}

/// WHAT: Closing mid-capture finalizes and discards the recording
/// WHY: Nothing will ever select it, so the file would leak
#[tokio::test]
async fn given_active_recording_when_closing_then_capture_discarded() {
    let storage = Arc::new(FakeStorage::default());
    let recorder = Arc::new(FakeRecorder::new());
    let capability: Arc<dyn RecordingCapability> = recorder.clone();
    let mut store = store_with(&storage);
    assert!(
        store
            .start_recording(RecordingSession::new(capability, CaptureOptions::default()))
            .await
            .is_ok()
    );

    store.close().await;

    assert!(!store.is_recording());
    assert_eq!(recorder.log.count("stop"), 1);
    assert_eq!(
        storage.deleted(),
        vec![format!("{}/capture-1.m4a", PRIVATE_ROOT)]
    );
}

/// WHAT: Record, select, preview to completion
/// WHY: The end-to-end path the composer screen drives
#[tokio::test]
#[allow(clippy::panic)]
async fn given_new_recording_when_previewed_to_the_end_then_finished_at_zero() {
    // Given: A store, recorder and player
    let storage = Arc::new(FakeStorage::default());
    let recorder: Arc<dyn RecordingCapability> = Arc::new(FakeRecorder::new());
    let player = Arc::new(FakePlayer::new());
    let mut store = store_with(&storage);

    // When: Recording and stopping
    assert!(
        store
            .start_recording(RecordingSession::new(recorder, CaptureOptions::default()))
            .await
            .is_ok()
    );
    assert!(matches!(
        store.recording_state(),
        RecordingState::Recording { .. }
    ));
    let Ok(handle) = store.stop_recording().await else {
        panic!("stop should produce a handle");
    };

    // Then: Named recording-<millis>.m4a, not yet selected
    let name = handle.display_name();
    let millis = name
        .strip_prefix("recording-")
        .and_then(|rest| rest.strip_suffix(".m4a"));
    assert!(millis.is_some_and(|m| !m.is_empty() && m.bytes().all(|b| b.is_ascii_digit())));
    assert!(store.audio_handle().is_none());

    // When: Selecting and toggling the preview
    store.set_audio_handle(Some(handle)).await;
    assert!(store.toggle_preview(player.clone()).await.is_ok());
    assert_eq!(
        store.playback().map(|s| s.state()),
        Some(PlaybackState::Playing)
    );

    // And: Ticks arrive with increasing positions
    let Some(sink) = player.last_sink() else {
        panic!("expected a sink");
    };
    let mut last = 0;
    for position in [1_000, 4_000, 9_500] {
        sink.push(PlaybackStatus::loaded(position, DURATION_MS, true));
        let Some(session) = store.playback_mut() else {
            panic!("session should be attached");
        };
        assert_eq!(session.drain_status().await, 1);
        assert!(store.preview().position_millis > last);
        last = store.preview().position_millis;
    }
    assert!(store.preview().is_playing);

    // And: The sound finishes
    sink.push(PlaybackStatus::finished(DURATION_MS));
    if let Some(session) = store.playback_mut() {
        assert!(session.next_status().await.is_some());
    }

    // Then: Finished at position 0
    assert_eq!(
        store.playback().map(|s| s.state()),
        Some(PlaybackState::Finished)
    );
    assert_eq!(store.preview().position_millis, 0);
    assert!(!store.preview().is_playing);

    // And: Toggling restarts from the beginning
    assert!(store.toggle_preview(player.clone()).await.is_ok());
    assert_eq!(
        store.playback().map(|s| s.state()),
        Some(PlaybackState::Playing)
    );
    assert_eq!(player.log.count("load:1"), 1);

    store.close().await;
}

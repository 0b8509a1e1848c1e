mod common;

use common::{wait_until, CapturingInjector, CapturingNotifier};
use replica_core::{
    Dispatcher, DispatcherConfig, Imitator, Key, KeyMessage, LineError, PlaybackError,
    PlaybackOutcome, PlayerConfig, Point, PointerMessage, PointerPayload, ReleasedProbe,
    SessionConflict, SessionError, SessionPlayer, SessionRecorder, SyntheticInput,
};
use std::fs;
use std::sync::Arc;
use std::time::Duration;

fn press(d: &Dispatcher, key: Key, down: bool) {
    let message = if down {
        KeyMessage::KeyDown
    } else {
        KeyMessage::KeyUp
    };
    d.handle_raw_key(0, message, key.virtual_key());
}

struct Rig {
    dispatcher: Dispatcher,
    imitator: Imitator,
    injector: Arc<CapturingInjector>,
    notifier: Arc<CapturingNotifier>,
}

fn rig() -> Rig {
    let dispatcher = Dispatcher::new(&DispatcherConfig::default(), &ReleasedProbe, Point::default());
    let injector = Arc::new(CapturingInjector::new());
    let notifier = Arc::new(CapturingNotifier::default());
    let imitator = Imitator::new(
        dispatcher.clone(),
        PlayerConfig::default(),
        injector.clone(),
        notifier.clone(),
    );
    Rig {
        dispatcher,
        imitator,
        injector,
        notifier,
    }
}

fn player(recorder: Arc<SessionRecorder>) -> (SessionPlayer, Arc<CapturingInjector>, Arc<CapturingNotifier>) {
    let injector = Arc::new(CapturingInjector::new());
    let notifier = Arc::new(CapturingNotifier::default());
    let player = SessionPlayer::new(
        PlayerConfig::default(),
        injector.clone(),
        notifier.clone(),
        recorder,
    );
    (player, injector, notifier)
}

#[test]
fn recorded_session_replays_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.log");
    let rig = rig();
    rig.imitator.record(&path, &[Key::F9], &[Key::F10]).unwrap();

    let recorder = rig.dispatcher.recorder().clone();
    press(&rig.dispatcher, Key::F9, true);
    assert!(wait_until(|| recorder.is_recording(&path)));
    press(&rig.dispatcher, Key::F9, false);

    press(&rig.dispatcher, Key::A, true);
    press(&rig.dispatcher, Key::A, false);
    rig.dispatcher
        .handle_raw_pointer(0, PointerMessage::Move, PointerPayload::at(100, 200));
    rig.dispatcher
        .handle_raw_pointer(0, PointerMessage::Wheel, PointerPayload::scroll(-120));

    press(&rig.dispatcher, Key::F10, true);
    assert!(wait_until(|| !recorder.is_recording(&path)));
    press(&rig.dispatcher, Key::F10, false);
    assert!(rig.notifier.saw("Started recording to"));
    assert!(rig.notifier.saw("Stopped recording to"));

    let kinds: Vec<String> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| l.split_once(',').unwrap().1.to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["KeyDown,A", "KeyUp,A", "MouseMove,100,200", "MouseWheel,0,-120"]
    );

    let outcome = rig.imitator.player().start(&path).unwrap().join();
    assert!(matches!(outcome, PlaybackOutcome::Finished));
    assert_eq!(
        rig.injector.batches(),
        vec![
            vec![SyntheticInput::KeyDown(Key::A)],
            vec![SyntheticInput::KeyUp(Key::A)],
            vec![SyntheticInput::MoveTo(Point::new(100, 200))],
            vec![SyntheticInput::Wheel(-120)],
        ]
    );
}

#[test]
fn replay_follows_recorded_timing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timed.log");
    fs::write(&path, "0,KeyDown,A\n50,KeyUp,A\n").unwrap();

    let (player, injector, notifier) = player(Arc::new(SessionRecorder::new()));
    let outcome = player.start(&path).unwrap().join();
    assert!(matches!(outcome, PlaybackOutcome::Finished));

    let timed = injector.timed();
    assert_eq!(timed.len(), 2);
    assert_eq!(timed[0].1, vec![SyntheticInput::KeyDown(Key::A)]);
    assert_eq!(timed[1].1, vec![SyntheticInput::KeyUp(Key::A)]);
    let gap = timed[1].0 - timed[0].0;
    assert!(gap >= Duration::from_millis(40), "gap {gap:?}");
    assert!(gap < Duration::from_millis(1000), "gap {gap:?}");

    assert!(!player.is_playing(&path));
    assert!(notifier.saw("Finished playing"));
}

#[test]
fn playback_of_a_recording_path_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.log");
    let recorder = Arc::new(SessionRecorder::new());
    recorder.start(&path, Vec::<Key>::new()).unwrap();

    let (player, injector, _) = player(recorder.clone());
    let err = player.start(&path).err().unwrap();
    assert!(matches!(
        err,
        SessionError::Conflict(SessionConflict::NowRecording(ref p)) if *p == path
    ));
    assert_eq!(err.to_string(), format!("Now recording to {}", path.display()));
    assert!(recorder.is_recording(&path));
    assert!(!player.is_playing(&path));
    assert_eq!(injector.len(), 0);
}

#[test]
fn second_start_while_playing_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.log");
    fs::write(&path, "0,KeyDown,A\n5000,KeyUp,A\n").unwrap();

    let (player, _, _) = player(Arc::new(SessionRecorder::new()));
    let handle = player.start(&path).unwrap();
    let err = player.start(&path).err().unwrap();
    assert!(matches!(
        err,
        SessionError::Conflict(SessionConflict::AlreadyPlaying(_))
    ));
    assert!(player.stop(&path));
    assert!(matches!(handle.join(), PlaybackOutcome::Stopped));
}

#[test]
fn interrupted_playback_releases_held_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("held.log");
    fs::write(&path, "0,KeyDown,A\n0,KeyDown,LShiftKey\n5000,KeyUp,A\n").unwrap();

    let (player, injector, notifier) = player(Arc::new(SessionRecorder::new()));
    let handle = player.start(&path).unwrap();
    assert!(wait_until(|| injector.len() == 2));
    assert!(player.stop(&path));

    assert!(matches!(handle.join(), PlaybackOutcome::Stopped));
    let batches = injector.batches();
    assert_eq!(batches.len(), 3);
    let released = batches.last().unwrap();
    assert!(released.contains(&SyntheticInput::KeyUp(Key::A)));
    assert!(released.contains(&SyntheticInput::KeyUp(Key::LShiftKey)));
    assert!(!player.is_playing(&path));
    assert!(notifier.saw("Stopped playing"));
}

#[test]
fn malformed_line_aborts_after_releasing_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.log");
    fs::write(&path, "0,KeyDown,B\n\n10,KeyDown,NoSuchKey\n20,KeyUp,B\n").unwrap();

    let (player, injector, notifier) = player(Arc::new(SessionRecorder::new()));
    match player.start(&path).unwrap().join() {
        PlaybackOutcome::Failed(PlaybackError::Malformed { line, source, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(source, LineError::UnknownKey("NoSuchKey".into()));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(
        injector.batches(),
        vec![
            vec![SyntheticInput::KeyDown(Key::B)],
            vec![SyntheticInput::KeyUp(Key::B)],
        ]
    );
    assert!(!player.is_playing(&path));
    assert!(notifier.saw("Failed to parse line 3."));
}

#[test]
fn play_binding_starts_and_stops_playback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bound.log");
    fs::write(&path, "0,KeyDown,C\n5000,KeyUp,C\n").unwrap();

    let rig = rig();
    rig.imitator.play(&path, &[Key::F5], &[Key::F6]).unwrap();

    press(&rig.dispatcher, Key::F5, true);
    assert!(wait_until(|| rig.imitator.player().is_playing(&path)));
    assert!(wait_until(|| rig.injector.len() == 1));
    press(&rig.dispatcher, Key::F5, false);

    press(&rig.dispatcher, Key::F6, true);
    assert!(wait_until(|| rig.notifier.saw("Stopped playing")));
    assert!(!rig.imitator.player().is_playing(&path));
    assert_eq!(
        rig.injector.batches().last().unwrap(),
        &vec![SyntheticInput::KeyUp(Key::C)]
    );
}

#[test]
fn play_binding_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.log");
    let rig = rig();
    rig.imitator.play(&path, &[Key::F7], &[Key::F8]).unwrap();

    press(&rig.dispatcher, Key::F7, true);
    assert!(wait_until(|| rig.notifier.saw("Not found")));
    assert_eq!(rig.injector.len(), 0);
}

#[test]
fn start_is_announced_before_a_short_session_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quick.log");
    fs::write(&path, "0,KeyPress,Q\n").unwrap();

    let rig = rig();
    rig.imitator.play(&path, &[Key::F3], &[Key::F4]).unwrap();
    press(&rig.dispatcher, Key::F3, true);
    assert!(wait_until(|| rig.notifier.saw("Finished playing")));

    let shown = path.display().to_string();
    assert_eq!(
        rig.notifier.messages(),
        vec![
            format!("Started playing {shown}"),
            format!("Finished playing {shown}"),
        ]
    );
}

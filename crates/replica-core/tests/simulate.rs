mod common;

use common::CapturingInjector;
use replica_core::{InputBatch, Key, Point, Simulator, SyntheticInput};
use std::sync::Arc;

fn simulator() -> (Simulator, Arc<CapturingInjector>) {
    let injector = Arc::new(CapturingInjector::new());
    (Simulator::new(injector.clone()), injector)
}

#[test]
fn each_call_is_one_batch() {
    let (sim, injector) = simulator();
    sim.key_down(&[Key::LShiftKey], 1).unwrap();
    sim.type_text("hi!", 2).unwrap();
    sim.key_up(&[Key::LShiftKey], 1).unwrap();
    sim.move_by(-5, 10).unwrap();
    sim.move_to(300, 400).unwrap();

    assert_eq!(
        injector.batches(),
        vec![
            vec![SyntheticInput::KeyDown(Key::LShiftKey)],
            vec![
                SyntheticInput::Text("hi!".into()),
                SyntheticInput::Text("hi!".into()),
            ],
            vec![SyntheticInput::KeyUp(Key::LShiftKey)],
            vec![SyntheticInput::MoveBy(Point::new(-5, 10))],
            vec![SyntheticInput::MoveTo(Point::new(300, 400))],
        ]
    );
}

#[test]
fn repeated_press_and_scroll() {
    let (sim, injector) = simulator();
    sim.key_press(&[Key::Tab], 3).unwrap();
    sim.wheel(2, 1).unwrap();
    sim.tilt(-1, 2).unwrap();

    let batches = injector.batches();
    assert_eq!(batches.len(), 3);
    assert_eq!(
        batches[0],
        (0..3)
            .flat_map(|_| [SyntheticInput::KeyDown(Key::Tab), SyntheticInput::KeyUp(Key::Tab)])
            .collect::<Vec<_>>()
    );
    assert_eq!(batches[1], vec![SyntheticInput::Wheel(240)]);
    assert_eq!(
        batches[2],
        vec![SyntheticInput::Tilt(-120), SyntheticInput::Tilt(-120)]
    );
}

#[test]
fn empty_batches_are_not_sent() {
    let (sim, injector) = simulator();
    sim.type_text("", 5).unwrap();
    sim.key_press(&[Key::A], 0).unwrap();
    sim.send(InputBatch::new()).unwrap();
    assert_eq!(injector.len(), 0);
}

#[test]
fn combined_batch_keeps_order() {
    let (sim, injector) = simulator();
    let batch = InputBatch::new()
        .key_down(&[Key::LControlKey, Key::LShiftKey], 1)
        .key_press(&[Key::S], 1)
        .key_up(&[Key::LShiftKey, Key::LControlKey], 1);
    sim.send(batch).unwrap();

    assert_eq!(
        injector.batches(),
        vec![vec![
            SyntheticInput::KeyDown(Key::LControlKey),
            SyntheticInput::KeyDown(Key::LShiftKey),
            SyntheticInput::KeyDown(Key::S),
            SyntheticInput::KeyUp(Key::S),
            SyntheticInput::KeyUp(Key::LShiftKey),
            SyntheticInput::KeyUp(Key::LControlKey),
        ]]
    );
}

//! Synthetic input descriptors and the injection seam.

use crate::{Key, Point, WHEEL_DELTA};
use std::sync::Arc;
use tracing::debug;

/// One synthetic input step. Wheel and tilt deltas are in raw wheel units
/// (see [`crate::WHEEL_DELTA`]), positive meaning up / right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticInput {
    KeyDown(Key),
    KeyUp(Key),
    /// Type `text` as Unicode characters, independent of the keyboard layout.
    Text(String),
    MoveTo(Point),
    /// Move the pointer by an offset from where it is.
    MoveBy(Point),
    Wheel(i32),
    Tilt(i32),
}

/// Injects synthetic input into the OS. Each call is one ordered batch.
pub trait Injector: Send + Sync {
    fn inject(&self, batch: &[SyntheticInput]) -> Result<(), String>;
}

/// Injector that only logs what it would send.
pub struct NoopInjector;

impl Injector for NoopInjector {
    fn inject(&self, batch: &[SyntheticInput]) -> Result<(), String> {
        debug!(?batch, "NoopInjector: would inject");
        Ok(())
    }
}

/// Builder for an ordered batch. Every step takes a repeat count `n`; a
/// multi-key step repeats the whole sequence `n` times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBatch {
    inputs: Vec<SyntheticInput>,
}

impl InputBatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn repeat(mut self, n: usize, step: impl Fn(&mut Vec<SyntheticInput>)) -> Self {
        for _ in 0..n {
            step(&mut self.inputs);
        }
        self
    }

    pub fn key_down(self, keys: &[Key], n: usize) -> Self {
        self.repeat(n, |out| out.extend(keys.iter().map(|k| SyntheticInput::KeyDown(*k))))
    }

    pub fn key_up(self, keys: &[Key], n: usize) -> Self {
        self.repeat(n, |out| out.extend(keys.iter().map(|k| SyntheticInput::KeyUp(*k))))
    }

    /// Down then up for each key in turn.
    pub fn key_press(self, keys: &[Key], n: usize) -> Self {
        self.repeat(n, |out| {
            for key in keys {
                out.push(SyntheticInput::KeyDown(*key));
                out.push(SyntheticInput::KeyUp(*key));
            }
        })
    }

    pub fn text(self, text: &str, n: usize) -> Self {
        if text.is_empty() {
            return self;
        }
        self.repeat(n, |out| out.push(SyntheticInput::Text(text.to_string())))
    }

    pub fn move_to(mut self, point: Point) -> Self {
        self.inputs.push(SyntheticInput::MoveTo(point));
        self
    }

    pub fn move_by(mut self, offset: Point) -> Self {
        self.inputs.push(SyntheticInput::MoveBy(offset));
        self
    }

    /// `notches` wheel clicks, positive scrolling up.
    pub fn wheel(self, notches: i32, n: usize) -> Self {
        self.repeat(n, |out| out.push(SyntheticInput::Wheel(notches * WHEEL_DELTA)))
    }

    /// `notches` horizontal clicks, positive scrolling right.
    pub fn tilt(self, notches: i32, n: usize) -> Self {
        self.repeat(n, |out| out.push(SyntheticInput::Tilt(notches * WHEEL_DELTA)))
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn as_slice(&self) -> &[SyntheticInput] {
        &self.inputs
    }

    pub fn into_inputs(self) -> Vec<SyntheticInput> {
        self.inputs
    }
}

/// Convenience front end over an [`Injector`]: each call sends one batch.
#[derive(Clone)]
pub struct Simulator {
    injector: Arc<dyn Injector>,
}

impl Simulator {
    pub fn new(injector: Arc<dyn Injector>) -> Self {
        Self { injector }
    }

    /// Send `batch`. Empty batches are not forwarded.
    pub fn send(&self, batch: InputBatch) -> Result<(), String> {
        if batch.is_empty() {
            return Ok(());
        }
        debug!(steps = batch.as_slice().len(), "simulating input");
        self.injector.inject(batch.as_slice())
    }

    pub fn key_down(&self, keys: &[Key], n: usize) -> Result<(), String> {
        self.send(InputBatch::new().key_down(keys, n))
    }

    pub fn key_up(&self, keys: &[Key], n: usize) -> Result<(), String> {
        self.send(InputBatch::new().key_up(keys, n))
    }

    pub fn key_press(&self, keys: &[Key], n: usize) -> Result<(), String> {
        self.send(InputBatch::new().key_press(keys, n))
    }

    pub fn type_text(&self, text: &str, n: usize) -> Result<(), String> {
        self.send(InputBatch::new().text(text, n))
    }

    pub fn move_to(&self, x: i32, y: i32) -> Result<(), String> {
        self.send(InputBatch::new().move_to(Point::new(x, y)))
    }

    pub fn move_by(&self, dx: i32, dy: i32) -> Result<(), String> {
        self.send(InputBatch::new().move_by(Point::new(dx, dy)))
    }

    pub fn wheel(&self, notches: i32, n: usize) -> Result<(), String> {
        self.send(InputBatch::new().wheel(notches, n))
    }

    pub fn tilt(&self, notches: i32, n: usize) -> Result<(), String> {
        self.send(InputBatch::new().tilt(notches, n))
    }
}

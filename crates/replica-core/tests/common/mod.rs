#![allow(dead_code)]

use replica_core::{Injector, Notifier, SyntheticInput};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Injector that keeps every batch together with when it arrived.
pub struct CapturingInjector {
    started: Instant,
    batches: Mutex<Vec<(Duration, Vec<SyntheticInput>)>>,
}

impl CapturingInjector {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn batches(&self) -> Vec<Vec<SyntheticInput>> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .map(|(_, b)| b.clone())
            .collect()
    }

    pub fn timed(&self) -> Vec<(Duration, Vec<SyntheticInput>)> {
        self.batches.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

impl Injector for CapturingInjector {
    fn inject(&self, batch: &[SyntheticInput]) -> Result<(), String> {
        self.batches
            .lock()
            .unwrap()
            .push((self.started.elapsed(), batch.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub struct CapturingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CapturingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn saw(&self, prefix: &str) -> bool {
        self.messages().iter().any(|m| m.starts_with(prefix))
    }
}

impl Notifier for CapturingNotifier {
    fn notify(&self, _title: &str, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

/// Poll `cond` until it holds or two seconds pass.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

//! Worker pool that runs trigger callbacks off the notification path.
//!
//! The dispatcher enqueues one job per fired trigger and returns immediately.
//! Workers run each job in isolation: an `Err` or a panic is logged and the
//! worker moves on to the next job.

use crate::trigger::{Callback, TriggerEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

struct Job {
    callback: Callback,
    event: TriggerEvent,
}

pub struct CallbackPool {
    job_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl CallbackPool {
    /// Spawn `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        let (job_tx, job_rx) = unbounded::<Job>();
        let workers = (0..workers.max(1))
            .filter_map(|index| {
                let job_rx = job_rx.clone();
                thread::Builder::new()
                    .name(format!("replica-callback-{index}"))
                    .spawn(move || worker_loop(job_rx))
                    .map_err(|e| error!(index, error = %e, "failed to spawn callback worker"))
                    .ok()
            })
            .collect::<Vec<_>>();

        info!(workers = workers.len(), "callback pool started");
        Self {
            job_tx: Some(job_tx),
            workers,
        }
    }

    /// Queue a callback invocation. Never blocks.
    pub fn submit(&self, callback: Callback, event: TriggerEvent) {
        let Some(job_tx) = &self.job_tx else {
            return;
        };
        if let Err(e) = job_tx.send(Job { callback, event }) {
            warn!(trigger = %e.0.event.name, "callback pool closed, dropping job");
        }
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for CallbackPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain what is queued and exit.
        self.job_tx.take();
        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // The last handle can be dropped by a callback on a worker.
            if worker.thread().id() != current {
                let _ = worker.join();
            }
        }
        debug!("callback pool stopped");
    }
}

fn worker_loop(job_rx: Receiver<Job>) {
    while let Ok(job) = job_rx.recv() {
        run_job(job);
    }
}

fn run_job(job: Job) {
    let Job { callback, event } = job;
    match panic::catch_unwind(AssertUnwindSafe(|| callback(&event))) {
        Ok(Ok(())) => {}
        Ok(Err(message)) => {
            warn!(trigger = %event.name, error = %message, "trigger callback failed");
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(trigger = %event.name, panic = %message, "trigger callback panicked");
        }
    }
}

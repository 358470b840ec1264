//! Start/stop lifecycle for entities that run on their own thread

use crossbeam_channel::{bounded, Sender, TryRecvError};
use log::{debug, error};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::locks::lock;

/// Periodic work driven by a [`Runnable`]
///
/// `tick` is called back to back on the worker thread. It has to return
/// within a bounded time, otherwise a stop request is never observed.
pub trait Tick: Send + Sync + 'static {
    fn tick(&self);

    /// Runs on the starting thread right before the worker is launched
    fn on_start(&self) {}
}

struct Worker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// A `Stopped -> Running -> Stopped` state machine around a worker thread
pub struct Runnable {
    name: String,
    running: AtomicBool,
    worker: Mutex<Option<Worker>>,
}

impl Runnable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    /// Launches a worker thread calling `target.tick()` until stopped.
    /// No-op when already running.
    pub fn start<T: Tick>(&self, target: Arc<T>) {
        let mut worker = lock(&self.worker);
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        target.on_start();
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || loop {
                match stop_rx.try_recv() {
                    Err(TryRecvError::Empty) => target.tick(),
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                }
            });

        match spawned {
            Ok(handle) => {
                debug!("{} started", self.name);
                *worker = Some(Worker {
                    stop: stop_tx,
                    handle,
                });
            }
            Err(err) => {
                error!("Failed to spawn worker for {}: {}", self.name, err);
                self.running.store(false, Ordering::Release);
            }
        }
    }

    /// Asks the worker to exit once its current tick completes and waits for
    /// it. No-op when not running.
    ///
    /// A panic raised by the worker is resumed on the calling thread.
    pub fn stop(&self) {
        let mut worker = lock(&self.worker);
        if self
            .running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let Some(Worker { stop, handle }) = worker.take() else {
            return;
        };
        // The worker may already be gone, in which case nobody listens.
        let _ = stop.send(());

        // Never join ourselves.
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if let Err(payload) = handle.join() {
            drop(worker);
            error!("{} worker panicked", self.name);
            panic::resume_unwind(payload);
        }
        debug!("{} stopped", self.name);
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

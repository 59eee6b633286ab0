use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::error::{CrowdinError, Result};

/// Result of work finishing on another thread, delivered through a channel.
///
/// Dropping the producing side without an answer resolves to
/// `CrowdinError::Cancelled`.
pub struct Task<T> {
    rx: Receiver<Result<T>>,
}

/// Producing half of a `Task` created with [`Task::channel`].
pub struct Completer<T> {
    tx: Sender<Result<T>>,
}

impl<T> Completer<T> {
    pub fn complete(self, result: Result<T>) {
        // receiver gone: nobody is waiting anymore
        let _ = self.tx.send(result);
    }
}

impl<T: Send + 'static> Task<T> {
    pub fn spawn<F>(f: F) -> Task<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (completer, task) = Task::channel();
        thread::spawn(move || completer.complete(f()));
        task
    }

    pub fn channel() -> (Completer<T>, Task<T>) {
        let (tx, rx) = mpsc::channel();
        (Completer { tx }, Task { rx })
    }

    pub fn ready(result: Result<T>) -> Task<T> {
        let (completer, task) = Task::channel();
        completer.complete(result);
        task
    }

    /// Blocks until the result is available.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().unwrap_or(Err(CrowdinError::Cancelled))
    }

    /// Non-blocking poll; `None` while still running.
    pub fn try_take(&self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(CrowdinError::Cancelled)),
        }
    }

    /// Runs `f` with the result on a background thread once it arrives.
    pub fn then<F>(self, f: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<T>) + Send + 'static,
    {
        thread::spawn(move || f(self.wait()))
    }
}

//! Task handle implementation.

use crate::error::TaskError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// What the worker thread reports back through the completion channel
enum Completion<T, E> {
    Returned(Result<T, E>),
    Panicked(String),
}

/// A blocking call running on its own OS thread.
///
/// The handle owns the thread and a one-shot channel that serves as both
/// the completion signal and the result slot. The result is only
/// observable through [`TaskHandle::join`] or [`TaskHandle::join_timeout`].
pub struct TaskHandle<T, E>
where
    E: std::error::Error + 'static,
{
    name: String,
    thread: Option<JoinHandle<()>>,
    completion: Receiver<Completion<T, E>>,
}

impl<T, E> TaskHandle<T, E>
where
    T: Send + 'static,
    E: std::error::Error + Send + 'static,
{
    /// Start `task` on a new named thread and return immediately.
    pub fn start<F>(name: impl Into<String>, task: F) -> Result<Self, TaskError<E>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let name = name.into();
        let (sender, receiver) = bounded(1);

        let thread = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let completion = match panic::catch_unwind(AssertUnwindSafe(task)) {
                    Ok(result) => Completion::Returned(result),
                    Err(payload) => Completion::Panicked(panic_message(payload.as_ref())),
                };
                // The receiver is gone only if the caller stopped waiting
                let _ = sender.send(completion);
            })
            .map_err(|source| TaskError::Spawn {
                task: name.clone(),
                source,
            })?;

        debug!(task = %name, "Task started");

        Ok(Self {
            name,
            thread: Some(thread),
            completion: receiver,
        })
    }

    /// Name given at start, also used as the thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the worker thread has terminated. Does not consume the result.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Block until the task finishes and return what it produced.
    pub fn join(mut self) -> Result<T, TaskError<E>> {
        let completion = self.completion.recv().ok();
        self.reap();
        self.settle(completion)
    }

    /// Like [`join`](Self::join), but give up after `timeout`.
    ///
    /// On expiry the worker is detached and keeps running to completion in
    /// the background; its result is discarded.
    pub fn join_timeout(mut self, timeout: Duration) -> Result<T, TaskError<E>> {
        match self.completion.recv_timeout(timeout) {
            Ok(completion) => {
                self.reap();
                self.settle(Some(completion))
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    task = %self.name,
                    timeout_ms = timeout.as_millis() as u64,
                    "Task timed out"
                );
                Err(TaskError::TimedOut {
                    task: self.name,
                    timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.reap();
                self.settle(None)
            }
        }
    }

    /// Wait until `deadline` at the latest.
    pub fn join_until(self, deadline: Instant) -> Result<T, TaskError<E>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.join_timeout(remaining)
    }

    fn reap(&mut self) {
        if let Some(thread) = self.thread.take() {
            // Panics are already caught inside the worker
            let _ = thread.join();
        }
    }

    fn settle(self, completion: Option<Completion<T, E>>) -> Result<T, TaskError<E>> {
        match completion {
            Some(Completion::Returned(Ok(value))) => {
                debug!(task = %self.name, "Task completed");
                Ok(value)
            }
            Some(Completion::Returned(Err(error))) => {
                debug!(task = %self.name, %error, "Task failed");
                Err(TaskError::Failed(error))
            }
            Some(Completion::Panicked(message)) => {
                warn!(task = %self.name, %message, "Task panicked");
                Err(TaskError::Panicked {
                    task: self.name,
                    message,
                })
            }
            None => Err(TaskError::Disconnected { task: self.name }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::model::Function;
use crate::services::decompiler::{DecompileError, Decompiler};
use crate::tagged::TaggedText;

/// Monotonic stamp distinguishing redisplay requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

/// Where the text of a finished redisplay came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    Cache,
    Decompiler,
}

/// Result a worker sends back to the UI-owning side.
#[derive(Debug, Clone)]
pub struct Redisplay {
    pub generation: Generation,
    pub function: Function,
    pub outcome: Result<(TaggedText, TextSource), DecompileError>,
}

/// Runs text production on worker threads and hands results back over a
/// single-consumer channel.
///
/// Workers never touch session state; they only send a [`Redisplay`]. The owner
/// drains the channel and keeps a result only if its generation is the latest
/// one issued, so the last *requested* redisplay wins regardless of which
/// worker finishes last.
pub struct RedisplayScheduler {
    decompiler: Arc<dyn Decompiler>,
    sender: mpsc::Sender<Redisplay>,
    receiver: mpsc::Receiver<Redisplay>,
    latest: Generation,
    workers: Vec<JoinHandle<()>>,
}

impl RedisplayScheduler {
    pub fn new(decompiler: Arc<dyn Decompiler>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { decompiler, sender, receiver, latest: Generation(0), workers: Vec::new() }
    }

    /// The most recently issued generation (`Generation(0)` before any request).
    pub fn latest(&self) -> Generation {
        self.latest
    }

    /// Spawn a worker producing the text for `function`.
    ///
    /// `cached` is the cache entry looked up by the caller; without one, or with
    /// `force_decompile`, the worker asks the decompiler.
    pub fn schedule(
        &mut self,
        function: Function,
        cached: Option<TaggedText>,
        force_decompile: bool,
    ) -> Generation {
        self.reap_finished();
        self.latest = Generation(self.latest.0 + 1);
        let generation = self.latest;
        let sender = self.sender.clone();
        let decompiler = Arc::clone(&self.decompiler);

        tracing::debug!(
            generation = generation.0,
            function = %function.name,
            cached = cached.is_some(),
            force_decompile,
            "scheduling redisplay"
        );

        let handle = thread::spawn(move || {
            let outcome = match cached {
                Some(text) if !force_decompile => Ok((text, TextSource::Cache)),
                _ => decompiler.decompile(&function).map(|text| (text, TextSource::Decompiler)),
            };
            // The receiver lives as long as the scheduler; a send error only
            // happens during teardown.
            let _ = sender.send(Redisplay { generation, function, outcome });
        });
        self.workers.push(handle);
        generation
    }

    /// Collect finished results without blocking, dropping stale ones.
    pub fn drain(&mut self) -> Option<Redisplay> {
        let mut current = None;
        while let Ok(message) = self.receiver.try_recv() {
            current = self.keep_if_latest(message).or(current);
        }
        self.reap_finished();
        current
    }

    /// Block until the latest generation's result arrives or `timeout` elapses.
    pub fn wait_latest(&mut self, timeout: Duration) -> Option<Redisplay> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(message) => {
                    if let Some(latest) = self.keep_if_latest(message) {
                        self.reap_finished();
                        return Some(latest);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn keep_if_latest(&self, message: Redisplay) -> Option<Redisplay> {
        if message.generation == self.latest {
            Some(message)
        } else {
            tracing::debug!(
                generation = message.generation.0,
                latest = self.latest.0,
                function = %message.function.name,
                "discarding stale redisplay"
            );
            None
        }
    }

    fn reap_finished(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) =
            self.workers.drain(..).partition(|handle| handle.is_finished());
        for handle in finished {
            if handle.join().is_err() {
                tracing::warn!("redisplay worker panicked");
            }
        }
        self.workers = running;
    }
}

impl Drop for RedisplayScheduler {
    fn drop(&mut self) {
        // No cancellation: let every worker run to completion.
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

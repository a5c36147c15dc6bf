//! Copied-indicator tracking
//!
//! A keyed table of code block key -> expiry. Every entry owns a timer task
//! that removes it when the feedback window ends; timers are cancelled when
//! an entry is replaced, on `cancel_all`, and when the tracker is dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::ClipboardWriter;
use crate::config::ClipboardConfig;

struct CopiedEntry {
    expires_at: Instant,
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct CopyState {
    entries: HashMap<String, CopiedEntry>,
    next_generation: u64,
}

/// Tracks which code blocks are inside their "Copied" window
pub struct CopyTracker {
    state: Arc<Mutex<CopyState>>,
    feedback: Duration,
    /// New copies clear every other indicator
    exclusive: bool,
    /// Parent of every timer token
    shutdown: CancellationToken,
}

impl CopyTracker {
    pub fn new(feedback: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(CopyState::default())),
            feedback,
            exclusive: false,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &ClipboardConfig) -> Self {
        Self::new(config.feedback()).with_exclusive(config.exclusive_indicator)
    }

    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    pub fn feedback(&self) -> Duration {
        self.feedback
    }

    /// Copy `text` and mark `key` as copied once the write succeeds
    ///
    /// Must be called within a tokio runtime. Failures are logged and leave
    /// the indicator untouched.
    pub fn copy(
        &self,
        clipboard: Arc<dyn ClipboardWriter>,
        text: impl Into<String>,
        key: impl Into<String>,
    ) -> JoinHandle<()> {
        let text = text.into();
        let key = key.into();
        let state = Arc::clone(&self.state);
        let shutdown = self.shutdown.clone();
        let feedback = self.feedback;
        let exclusive = self.exclusive;

        tokio::spawn(async move {
            let write = tokio::select! {
                result = clipboard.write_text(text) => result,
                _ = shutdown.cancelled() => return,
            };

            match write {
                Ok(()) => {
                    tracing::debug!(key = %key, "Copied code block");
                    mark_copied(&state, &shutdown, key, feedback, exclusive);
                }
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Failed to copy code");
                }
            }
        })
    }

    /// Whether `key` is inside its feedback window
    pub fn is_copied(&self, key: &str) -> bool {
        self.state
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.expires_at > Instant::now())
    }

    /// Keys currently showing the indicator
    pub fn copied_keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .state
            .lock()
            .entries
            .iter()
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Cancel every pending timer and clear all indicators
    pub fn cancel_all(&self) {
        let mut state = self.state.lock();
        for (_, entry) in state.entries.drain() {
            entry.cancel.cancel();
        }
    }
}

impl Drop for CopyTracker {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn mark_copied(
    state: &Arc<Mutex<CopyState>>,
    shutdown: &CancellationToken,
    key: String,
    feedback: Duration,
    exclusive: bool,
) {
    if shutdown.is_cancelled() {
        return;
    }

    let cancel = shutdown.child_token();
    let generation = {
        let mut guard = state.lock();
        if exclusive {
            for (_, entry) in guard.entries.drain() {
                entry.cancel.cancel();
            }
        }

        let generation = guard.next_generation;
        guard.next_generation += 1;

        let entry = CopiedEntry {
            expires_at: Instant::now() + feedback,
            generation,
            cancel: cancel.clone(),
        };
        if let Some(previous) = guard.entries.insert(key.clone(), entry) {
            previous.cancel.cancel();
        }
        generation
    };

    let state = Arc::clone(state);
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(feedback) => {
                let mut guard = state.lock();
                // A newer copy of the same key owns the slot now
                if guard.entries.get(&key).is_some_and(|e| e.generation == generation) {
                    guard.entries.remove(&key);
                }
            }
            _ = cancel.cancelled() => {}
        }
    });
}

//! Per-key cancellable write scheduling.
//!
//! Semantics are schedule-replace-cancel: scheduling under a key aborts any
//! pending task for the same key, so rapid edits to one item collapse into a
//! single commit carrying the final state. Keys debounce independently.
//!
//! Must be driven from inside a tokio runtime; commits run on the runtime
//! once the delay elapses, or synchronously on flush.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

pub type Commit = Arc<dyn Fn() + Send + Sync>;

struct PendingCommit {
    handle: JoinHandle<()>,
    commit: Commit,
}

pub struct Debouncer {
    delay: Duration,
    pending: Arc<Mutex<HashMap<String, PendingCommit>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Schedules `commit` to run after the delay, replacing (and cancelling)
    /// any commit already pending under the same key.
    pub fn schedule(&self, key: &str, commit: Commit) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(prev) = pending.remove(key) {
            prev.handle.abort();
        }

        let map = Arc::clone(&self.pending);
        let delay = self.delay;
        let task_key = key.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Take the entry back out so a commit runs at most once even if
            // flush raced with the timer.
            let commit = map.lock().unwrap().remove(&task_key).map(|p| p.commit);
            if let Some(commit) = commit {
                commit();
            }
        });

        pending.insert(key.to_string(), PendingCommit { handle, commit });
    }

    /// Drops the pending commit for a key without running it.
    pub fn cancel(&self, key: &str) -> bool {
        match self.pending.lock().unwrap().remove(key) {
            Some(prev) => {
                prev.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Runs the pending commit for a key now instead of waiting out the delay.
    pub fn flush(&self, key: &str) -> bool {
        let entry = self.pending.lock().unwrap().remove(key);
        match entry {
            Some(prev) => {
                prev.handle.abort();
                (prev.commit)();
                true
            }
            None => false,
        }
    }

    /// Runs every pending commit now. Used on teardown so edits made just
    /// before the panel closed still reach the store.
    pub fn flush_all(&self) {
        let drained: Vec<PendingCommit> = {
            let mut pending = self.pending.lock().unwrap();
            pending.drain().map(|(_, p)| p).collect()
        };
        for prev in drained {
            prev.handle.abort();
            (prev.commit)();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_commit(counter: &Arc<AtomicUsize>) -> Commit {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test]
    async fn test_rapid_schedules_commit_once() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            debouncer.schedule("item:0", counting_commit(&counter));
        }
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.pending(), 0);
    }

    #[tokio::test]
    async fn test_keys_debounce_independently() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let counter = Arc::new(AtomicUsize::new(0));

        debouncer.schedule("item:0", counting_commit(&counter));
        debouncer.schedule("item:1", counting_commit(&counter));
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel_drops_pending_commit() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let counter = Arc::new(AtomicUsize::new(0));

        debouncer.schedule("item:0", counting_commit(&counter));
        assert!(debouncer.cancel("item:0"));
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!debouncer.cancel("item:0"));
    }

    #[tokio::test]
    async fn test_flush_runs_immediately() {
        let debouncer = Debouncer::new(Duration::from_secs(60));
        let counter = Arc::new(AtomicUsize::new(0));

        debouncer.schedule("item:0", counting_commit(&counter));
        assert!(debouncer.flush("item:0"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_flush_all_drains_everything() {
        let debouncer = Debouncer::new(Duration::from_secs(60));
        let counter = Arc::new(AtomicUsize::new(0));

        debouncer.schedule("item:0", counting_commit(&counter));
        debouncer.schedule("item:1", counting_commit(&counter));
        debouncer.flush_all();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(debouncer.pending(), 0);
    }
}

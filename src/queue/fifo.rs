/*!
 * FIFO Queue
 * Unbounded first-in-first-out queue with an async "wait for next item" operation
 *
 * All state (node list, waiter slot, counters) sits behind one
 * `parking_lot::Mutex`. `put` and `get` hold it for O(1) work and never
 * suspend. `get_wait` suspends only after releasing it.
 */

use super::list::NodeList;
use super::slot::{WaiterSlot, Withdrawal};
use super::types::QueueStats;
use super::waiter::WakeHandle;
use crate::core::config::{QueueConfig, WakePolicy};
use crate::core::errors::QueueResult;
use crate::core::limits::DEFAULT_ARENA_CAPACITY;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

struct QueueState<T> {
    list: NodeList<T>,
    waiters: WaiterSlot,
    total_put: u64,
    total_get: u64,
    total_cleared: u64,
}

impl<T> QueueState<T> {
    #[inline]
    fn pop(&mut self) -> Option<T> {
        let value = self.list.pop_front()?;
        self.total_get += 1;
        Some(value)
    }
}

/// Outcome of one locked pass of the wait protocol
enum Attempt<'a, T> {
    /// A value was dequeued
    Ready(T),
    /// The queue is empty and the timeout is exhausted
    Expired,
    /// Registered as a waiter; suspend for at most the given time
    Pending(Registration<'a, T>, Option<Duration>),
}

/// Time left before `timeout` expires, `None` once it is exhausted
fn remaining(timeout: Duration, elapsed: Duration) -> Option<Duration> {
    timeout
        .checked_sub(elapsed)
        .filter(|remaining| !remaining.is_zero())
}

/// Unbounded FIFO queue
///
/// # Examples
///
/// ```
/// use ai_os_fifo::FifoQueue;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = Arc::new(FifoQueue::new());
///
/// let producer = queue.clone();
/// tokio::spawn(async move {
///     producer.put("hello");
/// });
///
/// assert_eq!(queue.get_wait(Some(Duration::from_secs(1))).await, Some("hello"));
/// assert_eq!(queue.get(), None);
/// # }
/// ```
pub struct FifoQueue<T> {
    state: Mutex<QueueState<T>>,
    config: QueueConfig,
}

impl<T> FifoQueue<T> {
    /// Create a queue with the default (shared waiter) configuration
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            state: Mutex::new(QueueState {
                list: NodeList::with_capacity(DEFAULT_ARENA_CAPACITY),
                waiters: WaiterSlot::new(config.wake_policy),
                total_put: 0,
                total_get: 0,
                total_cleared: 0,
            }),
            config,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Append a value and signal a pending waiter, if any
    pub fn put(&self, value: T) {
        let mut state = self.state.lock();
        state.list.push_back(value);
        state.total_put += 1;

        let woken = state.waiters.wake(1);
        if self.config.trace_operations {
            trace!(length = state.list.len(), woken = woken.count(), "put");
        }
    }

    /// Append every value in order; waiters are signalled once for the batch
    ///
    /// The iterator runs under the queue lock and must not touch this queue.
    pub fn extend<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut state = self.state.lock();
        let before = state.list.len();
        for value in values {
            state.list.push_back(value);
        }
        let added = state.list.len() - before;
        state.total_put += added as u64;

        let woken = state.waiters.wake(added);
        if woken.is_woken() {
            debug!(added, woken = woken.count(), "Batch put woke waiters");
        }
    }

    /// Remove and return the oldest value without waiting
    pub fn get(&self) -> Option<T> {
        let mut state = self.state.lock();
        let value = state.pop();
        if self.config.trace_operations {
            trace!(length = state.list.len(), hit = value.is_some(), "get");
        }
        value
    }

    /// Remove and return the oldest value, waiting for one if the queue is empty
    ///
    /// With `timeout = None` this waits indefinitely. Returns `None` once the
    /// timeout has elapsed without a value arriving; a zero timeout never
    /// suspends. Cancel-safe: dropping the future withdraws its registration.
    pub async fn get_wait(&self, timeout: Option<Duration>) -> Option<T> {
        // Tokio's clock, so paused-time runtimes see the same clock as the timer
        let start = tokio::time::Instant::now();

        loop {
            let (registration, remaining) = match self.attempt(timeout, start.elapsed()) {
                Attempt::Ready(value) => return Some(value),
                Attempt::Expired => return None,
                Attempt::Pending(registration, remaining) => (registration, remaining),
            };

            match remaining {
                Some(remaining) => {
                    if tokio::time::timeout(remaining, registration.handle.wait())
                        .await
                        .is_err()
                    {
                        trace!(handle = registration.handle.id(), "Wait timer fired");
                    }
                }
                None => registration.handle.wait().await,
            }

            registration.finish();
        }
    }

    /// Blocking counterpart of `get_wait` for plain OS threads
    ///
    /// Must not be called from within an async task: it parks the thread.
    pub fn get_wait_blocking(&self, timeout: Option<Duration>) -> Option<T> {
        // Wall clock, matching the condvar deadline in `wait_blocking`
        let start = std::time::Instant::now();

        loop {
            let (registration, remaining) = match self.attempt(timeout, start.elapsed()) {
                Attempt::Ready(value) => return Some(value),
                Attempt::Expired => return None,
                Attempt::Pending(registration, remaining) => (registration, remaining),
            };

            registration.handle.wait_blocking(remaining);
            registration.finish();
        }
    }

    /// One pass of the wait protocol under the lock
    fn attempt(&self, timeout: Option<Duration>, elapsed: Duration) -> Attempt<'_, T> {
        let mut state = self.state.lock();

        if let Some(value) = state.pop() {
            return Attempt::Ready(value);
        }

        let remaining = match timeout {
            Some(timeout) => match remaining(timeout, elapsed) {
                Some(remaining) => Some(remaining),
                None => {
                    trace!(?timeout, "get_wait timed out");
                    return Attempt::Expired;
                }
            },
            None => None,
        };

        let handle = state.waiters.register();
        Attempt::Pending(
            Registration {
                queue: self,
                handle,
                finished: false,
            },
            remaining,
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.state.lock().list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.lock().list.is_empty()
    }

    /// Inspect the oldest value without removing it
    ///
    /// `f` runs under the queue lock and must not touch this queue.
    pub fn peek_with<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        self.state.lock().list.front().map(f)
    }

    /// Remove every value, oldest first
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();
        let mut values = Vec::with_capacity(state.list.len());
        while let Some(value) = state.pop() {
            values.push(value);
        }
        state.list.clear();
        values
    }

    /// Drop every stored value; they count towards `total_cleared`, not `total_get`
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let dropped = state.list.len();
        state.list.clear();
        state.total_cleared += dropped as u64;
        debug!(dropped, "Queue cleared");
    }

    /// Number of consumers suspended in `get_wait`/`get_wait_blocking`
    pub fn waiter_count(&self) -> usize {
        self.state.lock().waiters.waiter_count()
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            length: state.list.len(),
            total_put: state.total_put,
            total_get: state.total_get,
            total_cleared: state.total_cleared,
            waiters: state.waiters.waiter_count(),
            wake_policy: state.waiters.policy(),
        }
    }

    /// Verify the internal list structure; O(n)
    pub fn validate(&self) -> QueueResult<()> {
        self.state.lock().list.validate()
    }
}

impl<T> Default for FifoQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FifoQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("FifoQueue")
            .field("length", &state.list.len())
            .field("waiters", &state.waiters.waiter_count())
            .field("wake_policy", &state.waiters.policy())
            .finish()
    }
}

/// A waiter's interest in a handle, withdrawn on drop
///
/// Dropping without `finish` means the wait was cancelled mid-suspension. Under
/// the fair policy a signal that already reached the cancelled waiter is passed
/// on, so a value left in the queue is not stranded behind a consumer that went
/// away. Shared signals reach every waiter and need no forwarding.
struct Registration<'a, T> {
    queue: &'a FifoQueue<T>,
    handle: Arc<WakeHandle>,
    finished: bool,
}

impl<T> Registration<'_, T> {
    /// Mark the suspension as completed normally
    fn finish(mut self) {
        self.finished = true;
    }
}

impl<T> Drop for Registration<'_, T> {
    fn drop(&mut self) {
        let mut state = self.queue.state.lock();

        match state.waiters.withdraw(&self.handle) {
            Withdrawal::Retained | Withdrawal::Removed => {}
            Withdrawal::Signalled
                if !self.finished && state.waiters.policy() == WakePolicy::Fair =>
            {
                let available = state.list.len();
                let forwarded = state.waiters.wake(available);
                debug!(
                    handle = self.handle.id(),
                    forwarded = forwarded.count(),
                    "Signalled waiter cancelled"
                );
            }
            Withdrawal::Signalled => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_put_get() {
        let queue = FifoQueue::new();
        queue.put(1);
        queue.put(2);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get(), Some(1));
        assert_eq!(queue.get(), Some(2));
        assert_eq!(queue.get(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stats_counters() {
        let queue = FifoQueue::with_config(QueueConfig::fair());
        queue.extend(0..5);
        queue.get();
        queue.drain();

        assert_eq!(
            queue.stats(),
            QueueStats {
                length: 0,
                total_put: 5,
                total_get: 5,
                total_cleared: 0,
                waiters: 0,
                wake_policy: WakePolicy::Fair,
            }
        );
    }

    #[test]
    fn test_clear_counted_separately() {
        let queue = FifoQueue::new();
        queue.extend(0..6);
        queue.get();
        queue.clear();
        queue.put(9);

        let stats = queue.stats();
        assert_eq!(stats.total_get, 1);
        assert_eq!(stats.total_cleared, 5);
        assert_eq!(
            stats.length as u64,
            stats.total_put - stats.total_get - stats.total_cleared
        );
    }

    #[test]
    fn test_debug_without_t_debug() {
        struct Opaque;
        let queue = FifoQueue::new();
        queue.put(Opaque);
        let rendered = format!("{:?}", queue);
        assert!(rendered.contains("length: 1"));
    }

    #[test]
    fn test_remaining() {
        assert_eq!(remaining(Duration::ZERO, Duration::ZERO), None);
        assert_eq!(
            remaining(Duration::from_millis(50), Duration::from_millis(80)),
            None
        );
        assert_eq!(
            remaining(Duration::from_secs(60), Duration::from_secs(15)),
            Some(Duration::from_secs(45))
        );
    }

    #[test]
    fn test_queue_is_send_sync() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<FifoQueue<String>>();
    }
}

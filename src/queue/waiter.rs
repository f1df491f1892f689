/*!
 * Wake Handle
 * One-shot completion signal shared between a queue and its waiting consumers
 *
 * A handle is completed at most once. Async consumers await it through
 * `tokio::sync::Notify`; blocking consumers park on a `parking_lot::Condvar`.
 * Both observe the same completion flag, so a completion that lands before the
 * consumer starts waiting is never lost.
 */

use crate::core::errors::{QueueError, QueueResult};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }
}

/// One-shot wake-up handle
#[derive(Debug)]
pub(crate) struct WakeHandle {
    id: u64,
    completed: Mutex<bool>,
    condvar: Condvar,
    notify: Notify,
}

impl WakeHandle {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            completed: Mutex::new(false),
            condvar: Condvar::new(),
            notify: Notify::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        *self.completed.lock()
    }

    /// Complete the handle, waking every async and blocking waiter
    ///
    /// Fails with `DoubleCompletion` if the handle was already completed.
    pub fn complete(&self) -> QueueResult<()> {
        {
            let mut completed = self.completed.lock();
            if *completed {
                return Err(QueueError::DoubleCompletion);
            }
            *completed = true;
        }

        self.condvar.notify_all();
        self.notify.notify_waiters();
        Ok(())
    }

    /// Suspend until the handle is completed
    ///
    /// Cancel-safe: dropping the future leaves the handle untouched.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);

        // Register before checking the flag so a completion in between still wakes us
        notified.as_mut().enable();
        if self.is_completed() {
            return;
        }

        notified.await;
    }

    /// Block the current thread until completion or timeout
    ///
    /// Returns `true` if completed, `false` if the timeout elapsed first.
    pub fn wait_blocking(&self, timeout: Option<Duration>) -> bool {
        let mut completed = self.completed.lock();

        // A timeout too large to represent as a deadline waits without one
        match timeout.and_then(|timeout| Instant::now().checked_add(timeout)) {
            None => {
                while !*completed {
                    self.condvar.wait(&mut completed);
                }
                true
            }
            Some(deadline) => {
                while !*completed {
                    if self.condvar.wait_until(&mut completed, deadline).timed_out() {
                        return *completed;
                    }
                }
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tokio_test::{assert_pending, assert_ready, task};

    #[test]
    fn test_complete_once() {
        let handle = WakeHandle::new(1);
        assert!(!handle.is_completed());
        assert!(handle.complete().is_ok());
        assert!(handle.is_completed());
        assert_eq!(handle.complete(), Err(QueueError::DoubleCompletion));
    }

    #[test]
    fn test_async_wait_woken() {
        let handle = WakeHandle::new(2);
        let mut wait = task::spawn(handle.wait());

        assert_pending!(wait.poll());
        handle.complete().unwrap();
        assert!(wait.is_woken());
        assert_ready!(wait.poll());
    }

    #[test]
    fn test_async_wait_after_completion() {
        let handle = WakeHandle::new(3);
        handle.complete().unwrap();

        let mut wait = task::spawn(handle.wait());
        assert_ready!(wait.poll());
    }

    #[test]
    fn test_blocking_wait_woken() {
        let handle = Arc::new(WakeHandle::new(4));
        let handle_clone = handle.clone();

        let waiter = thread::spawn(move || handle_clone.wait_blocking(Some(Duration::from_secs(1))));

        thread::sleep(Duration::from_millis(50));
        handle.complete().unwrap();

        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_blocking_wait_timeout() {
        let handle = WakeHandle::new(5);
        let start = Instant::now();
        assert!(!handle.wait_blocking(Some(Duration::from_millis(50))));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_blocking_wait_unrepresentable_deadline() {
        let handle = Arc::new(WakeHandle::new(6));
        let handle_clone = handle.clone();

        let waiter = thread::spawn(move || handle_clone.wait_blocking(Some(Duration::MAX)));

        thread::sleep(Duration::from_millis(50));
        handle.complete().unwrap();

        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_wake_result() {
        assert!(WakeResult::Woken(2).is_woken());
        assert_eq!(WakeResult::Woken(2).count(), 2);
        assert!(!WakeResult::NoWaiters.is_woken());
        assert_eq!(WakeResult::NoWaiters.count(), 0);
    }
}

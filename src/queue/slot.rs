/*!
 * Waiter Slot
 * Registration of consumers suspended in `get_wait`
 *
 * Always accessed under the queue lock. Two layouts, picked by `WakePolicy`:
 * - Shared: a single handle plus a count of interested waiters
 * - Fair: one handle per waiter, oldest at the front
 */

use super::waiter::{WakeHandle, WakeResult};
use crate::core::config::WakePolicy;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

/// Shared handle with the number of waiters currently depending on it
#[derive(Debug)]
struct SharedWaiter {
    handle: Arc<WakeHandle>,
    interest: usize,
}

#[derive(Debug)]
enum Waiters {
    Shared(Option<SharedWaiter>),
    Fair(VecDeque<Arc<WakeHandle>>),
}

/// Outcome of a waiter withdrawing its interest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Withdrawal {
    /// Interest dropped; the handle is still registered for others
    Retained,
    /// Last interest dropped; the handle was removed from the slot
    Removed,
    /// The handle had already been taken and signalled by a put
    Signalled,
}

#[derive(Debug)]
pub(crate) struct WaiterSlot {
    waiters: Waiters,
    next_id: u64,
}

impl WaiterSlot {
    pub fn new(policy: WakePolicy) -> Self {
        let waiters = match policy {
            WakePolicy::Shared => Waiters::Shared(None),
            WakePolicy::Fair => Waiters::Fair(VecDeque::new()),
        };
        Self {
            waiters,
            next_id: 1,
        }
    }

    /// Register interest and return the handle to wait on
    ///
    /// Shared: reuses the pending handle if one exists. Fair: always a new handle.
    pub fn register(&mut self) -> Arc<WakeHandle> {
        match &mut self.waiters {
            Waiters::Shared(slot) => {
                let next_id = &mut self.next_id;
                let waiter = slot.get_or_insert_with(|| {
                    let handle = Arc::new(WakeHandle::new(*next_id));
                    *next_id += 1;
                    trace!(handle = handle.id(), "Registered shared waiter");
                    SharedWaiter {
                        handle,
                        interest: 0,
                    }
                });
                waiter.interest += 1;
                waiter.handle.clone()
            }
            Waiters::Fair(queue) => {
                let handle = Arc::new(WakeHandle::new(self.next_id));
                self.next_id += 1;
                trace!(handle = handle.id(), position = queue.len(), "Registered fair waiter");
                queue.push_back(handle.clone());
                handle
            }
        }
    }

    /// Signal waiters that `available` new values were enqueued
    ///
    /// Every signalled handle leaves the slot before it is completed, so no
    /// handle can be completed twice.
    pub fn wake(&mut self, available: usize) -> WakeResult {
        if available == 0 {
            return WakeResult::NoWaiters;
        }

        match &mut self.waiters {
            Waiters::Shared(slot) => match slot.take() {
                Some(waiter) => {
                    complete(&waiter.handle);
                    WakeResult::Woken(waiter.interest)
                }
                None => WakeResult::NoWaiters,
            },
            Waiters::Fair(queue) => {
                let count = available.min(queue.len());
                for handle in queue.drain(..count) {
                    complete(&handle);
                }
                if count == 0 {
                    WakeResult::NoWaiters
                } else {
                    WakeResult::Woken(count)
                }
            }
        }
    }

    /// Withdraw one waiter's interest in `handle`
    pub fn withdraw(&mut self, handle: &Arc<WakeHandle>) -> Withdrawal {
        match &mut self.waiters {
            Waiters::Shared(slot) => {
                let Some(waiter) = slot.as_mut().filter(|w| Arc::ptr_eq(&w.handle, handle)) else {
                    return Withdrawal::Signalled;
                };
                waiter.interest -= 1;
                if waiter.interest == 0 {
                    *slot = None;
                    Withdrawal::Removed
                } else {
                    Withdrawal::Retained
                }
            }
            Waiters::Fair(queue) => match queue.iter().position(|h| Arc::ptr_eq(h, handle)) {
                Some(position) => {
                    queue.remove(position);
                    Withdrawal::Removed
                }
                None => Withdrawal::Signalled,
            },
        }
    }

    /// Number of waiters currently registered
    pub fn waiter_count(&self) -> usize {
        match &self.waiters {
            Waiters::Shared(slot) => slot.as_ref().map_or(0, |w| w.interest),
            Waiters::Fair(queue) => queue.len(),
        }
    }

    pub fn policy(&self) -> WakePolicy {
        match self.waiters {
            Waiters::Shared(_) => WakePolicy::Shared,
            Waiters::Fair(_) => WakePolicy::Fair,
        }
    }
}

fn complete(handle: &WakeHandle) {
    let result = handle.complete();
    debug_assert!(result.is_ok(), "handle {} completed twice", handle.id());
    trace!(handle = handle.id(), "Signalled waiter");
}

/*!
 * AI-OS FIFO Queue
 * Unbounded first-in-first-out queue with async "wait for next item" support
 *
 * - O(1) `put`/`get` over an arena-backed doubly-linked list
 * - `get_wait` suspends until a value arrives or an optional timeout elapses
 * - Shared (default) or fair wake-up of waiting consumers
 */

pub mod core;
pub mod monitoring;
pub mod queue;

// Re-exports
pub use crate::core::{QueueConfig, QueueError, QueueResult, WakePolicy};
pub use monitoring::init_tracing;
pub use queue::{FifoQueue, QueueStats};

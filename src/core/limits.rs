/*!
 * Queue Limits and Constants
 *
 * Centralized location for tuning values used by the queue and its waiters.
 */

// =============================================================================
// ARENA
// =============================================================================

/// Initial node arena capacity for `FifoQueue::new`
/// [PERF] Covers short bursts without regrowing the arena
pub const DEFAULT_ARENA_CAPACITY: usize = 16;

/// Free slots retained after `clear`/`drain`
/// Anything above this is released back to the allocator
pub const MAX_RETAINED_FREE_SLOTS: usize = 4096;

// =============================================================================
// WAITING
// =============================================================================

/// Environment variable selecting the wake policy (`shared` or `fair`)
pub const WAKE_POLICY_ENV: &str = "FIFO_WAKE_POLICY";

// =============================================================================
// TRACING
// =============================================================================

/// Environment variable enabling JSON trace output
pub const TRACE_JSON_ENV: &str = "FIFO_TRACE_JSON";

/// Default filter when RUST_LOG is unset
pub const DEFAULT_TRACE_FILTER: &str = "info";

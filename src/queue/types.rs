/*!
 * Queue Types
 * Snapshot types exposed for introspection
 */

use crate::core::config::WakePolicy;
use serde::{Deserialize, Serialize};

/// Queue statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Values currently stored
    pub length: usize,
    /// Values ever enqueued
    pub total_put: u64,
    /// Values ever dequeued (including `drain`)
    pub total_get: u64,
    /// Values dropped by `clear`
    pub total_cleared: u64,
    /// Consumers currently suspended in `get_wait`
    pub waiters: usize,
    pub wake_policy: WakePolicy,
}

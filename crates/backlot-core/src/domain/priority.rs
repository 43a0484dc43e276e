//! Job priority tiers.

use serde::{Deserialize, Serialize};

/// Dispatch priority. `Critical` is the most urgent; within a tier jobs are
/// dispatched in submission order (FIFO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Low,
    Normal,
    High,
    Critical,
}

impl JobPriority {
    /// Sort key for the selector: lower rank is dispatched first.
    pub fn rank(self) -> u8 {
        match self {
            JobPriority::Critical => 0,
            JobPriority::High => 1,
            JobPriority::Normal => 2,
            JobPriority::Low => 3,
        }
    }
}

impl Default for JobPriority {
    fn default() -> Self {
        JobPriority::Normal
    }
}

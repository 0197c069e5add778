//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background reconciliation worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron schedule for the orphan-blob sweep.
    #[serde(default = "default_sweep_schedule")]
    pub sweep_schedule: String,
    /// Blobs younger than this many minutes are never swept, so an
    /// in-flight upload cannot race the sweep.
    #[serde(default = "default_grace_minutes")]
    pub sweep_grace_minutes: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_schedule: default_sweep_schedule(),
            sweep_grace_minutes: default_grace_minutes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_schedule() -> String {
    // Every day at 03:00.
    "0 0 3 * * *".to_string()
}

fn default_grace_minutes() -> u64 {
    60
}

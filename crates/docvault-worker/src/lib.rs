//! # docvault-worker
//!
//! Scheduled maintenance. The only task today is the orphan-blob sweep,
//! which reclaims files on disk that no database row references.

pub mod scheduler;
pub mod sweep;

pub use scheduler::WorkerScheduler;
pub use sweep::{OrphanSweeper, SweepReport};

//! Orphan-blob reconciliation sweep.
//!
//! Create-side compensation normally keeps disk and database in step,
//! but a crash between a blob write and its row insert, or a failed
//! delete-side blob removal, can strand files on disk. The sweep walks
//! the store, subtracts every path the database still references, and
//! deletes the rest. Blobs younger than the grace period are left alone
//! because an upload may be mid-flight between write and insert.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use docvault_core::result::AppResult;
use docvault_database::repositories::RecordRepository;
use docvault_storage::BlobStore;

/// Outcome of a single sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Blobs examined.
    pub scanned: usize,
    /// Orphans removed.
    pub deleted: usize,
    /// Orphans skipped because they are within the grace period.
    pub skipped_recent: usize,
    /// Deletions that failed.
    pub failures: usize,
}

/// Deletes blobs on disk that no record references.
#[derive(Debug, Clone)]
pub struct OrphanSweeper {
    records: Arc<RecordRepository>,
    blobs: Arc<BlobStore>,
    grace: Duration,
}

impl OrphanSweeper {
    /// Creates a sweeper with the given grace period.
    pub fn new(records: Arc<RecordRepository>, blobs: Arc<BlobStore>, grace_minutes: u64) -> Self {
        Self {
            records,
            blobs,
            grace: Duration::minutes(grace_minutes as i64),
        }
    }

    /// Runs one full sweep.
    pub async fn sweep(&self) -> AppResult<SweepReport> {
        let referenced: HashSet<String> =
            self.records.all_storage_paths().await?.into_iter().collect();
        let cutoff = Utc::now() - self.grace;

        let report = sweep_blobs(&self.blobs, &referenced, cutoff).await?;
        info!(
            scanned = report.scanned,
            deleted = report.deleted,
            skipped_recent = report.skipped_recent,
            failures = report.failures,
            "Orphan sweep completed"
        );
        Ok(report)
    }
}

/// Walk the store and delete unreferenced blobs older than `cutoff`.
async fn sweep_blobs(
    blobs: &BlobStore,
    referenced: &HashSet<String>,
    cutoff: DateTime<Utc>,
) -> AppResult<SweepReport> {
    let mut report = SweepReport::default();

    for meta in blobs.list_all().await? {
        report.scanned += 1;

        if referenced.contains(&meta.path) {
            continue;
        }

        // No modification time means we cannot prove the blob is old
        // enough; treat it as recent.
        let old_enough = meta.modified.map(|m| m <= cutoff).unwrap_or(false);
        if !old_enough {
            report.skipped_recent += 1;
            continue;
        }

        match blobs.delete(&meta.path).await {
            Ok(()) => {
                info!(path = %meta.path, size = meta.size_bytes, "Deleted orphan blob");
                report.deleted += 1;
            }
            Err(e) => {
                // Keep sweeping; this blob gets another chance next run.
                warn!(path = %meta.path, error = %e, "Failed to delete orphan blob");
                report.failures += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    async fn store_with(paths: &[&str]) -> (tempfile::TempDir, BlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().to_str().unwrap()).await.unwrap();
        for path in paths {
            store.write(path, Bytes::from_static(b"data")).await.unwrap();
        }
        (dir, store)
    }

    #[tokio::test]
    async fn test_referenced_blobs_survive() {
        let (_dir, store) = store_with(&["a/live.pdf", "a/orphan.pdf"]).await;
        let referenced: HashSet<String> = ["a/live.pdf".to_string()].into_iter().collect();

        // Cutoff in the future makes every blob old enough.
        let report = sweep_blobs(&store, &referenced, Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.deleted, 1);
        assert!(store.exists("a/live.pdf").await.unwrap());
        assert!(!store.exists("a/orphan.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_recent_orphans_get_grace() {
        let (_dir, store) = store_with(&["fresh.bin"]).await;
        let referenced = HashSet::new();

        // Cutoff in the past: the just-written blob is newer than it.
        let report = sweep_blobs(&store, &referenced, Utc::now() - Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(report.deleted, 0);
        assert_eq!(report.skipped_recent, 1);
        assert!(store.exists("fresh.bin").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_store_sweeps_cleanly() {
        let (_dir, store) = store_with(&[]).await;
        let report = sweep_blobs(&store, &HashSet::new(), Utc::now()).await.unwrap();
        assert_eq!(report, SweepReport::default());
    }
}

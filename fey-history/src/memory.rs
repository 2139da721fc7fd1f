//! In-memory rate history.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use fey_core::error::Result;
use fey_core::traits::RateHistory;
use fey_core::types::RateSnapshot;

/// In-memory rate history.
///
/// Snapshots are kept sorted by timestamp; equal timestamps keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryRateHistory {
    snapshots: RwLock<Vec<RateSnapshot>>,
}

impl MemoryRateHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    /// Returns true if no snapshot has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }
}

#[async_trait]
impl RateHistory for MemoryRateHistory {
    #[instrument(skip(self, snapshot), fields(fey_amount = snapshot.fey_amount))]
    async fn record(&self, snapshot: &RateSnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write();
        let at = snapshots.partition_point(|s| s.timestamp <= snapshot.timestamp);
        snapshots.insert(at, snapshot.clone());
        debug!(total = snapshots.len(), "Recorded rate snapshot");
        Ok(())
    }

    async fn list(&self, limit: usize) -> Result<Vec<RateSnapshot>> {
        Ok(self.snapshots.read().iter().take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.snapshots.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tokio_test::assert_ok;

    fn snapshot_at(minutes: i64, fey: u64) -> RateSnapshot {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        RateSnapshot::from_amounts(1_000_000, fey, base + Duration::minutes(minutes)).unwrap()
    }

    #[tokio::test]
    async fn test_record_and_list_ascending() {
        let history = MemoryRateHistory::new();
        assert_ok!(history.record(&snapshot_at(10, 1_010_000)).await);
        assert_ok!(history.record(&snapshot_at(0, 1_000_000)).await);
        assert_ok!(history.record(&snapshot_at(5, 1_005_000)).await);

        let listed = history.list(10).await.unwrap();
        let amounts: Vec<u64> = listed.iter().map(|s| s.fey_amount).collect();
        assert_eq!(amounts, vec![1_000_000, 1_005_000, 1_010_000]);
        assert_eq!(history.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_limit_returns_oldest_first() {
        let history = MemoryRateHistory::new();
        for i in 0..5 {
            history.record(&snapshot_at(i, 1_000_000 + i as u64)).await.unwrap();
        }

        let listed = history.list(2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].fey_amount, 1_000_000);
        assert_eq!(listed[1].fey_amount, 1_000_001);
    }

    #[tokio::test]
    async fn test_empty() {
        let history = MemoryRateHistory::new();
        assert!(history.list(100).await.unwrap().is_empty());
        assert!(history.is_empty());
        assert_eq!(history.count().await.unwrap(), 0);
    }
}

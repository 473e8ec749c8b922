use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tokio::sync::RwLock;

/// Totals strictly above this value are flagged in the summary.
pub const USAGE_THRESHOLD: i128 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("device not found: {0}")]
    NotFound(String),
}

/// One row of the summary snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub device_id: String,
    pub readings: Vec<i64>,
    /// Sum of `readings`, widened so it cannot overflow.
    pub total: i128,
    /// `total > USAGE_THRESHOLD`
    pub exceeded: bool,
}

#[derive(Default)]
struct Inner {
    /// device_id → position in `devices`
    index: HashMap<String, usize>,
    /// Devices in first-insertion order.
    devices: Vec<(String, Vec<i64>)>,
}

/// In-memory store of every reading per device, in arrival order.
///
/// Wrapped in `Arc` so it can be cheaply cloned into handler state. A single
/// `tokio::sync::RwLock` guards both the index and the sequences, so an append
/// excludes every other append and every in-flight read.
#[derive(Clone, Default)]
pub struct ReadingStore {
    inner: Arc<RwLock<Inner>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the sequence for `device_id`, creating it if absent.
    /// Returns `true` when this was the device's first reading.
    pub async fn append(&self, device_id: &str, value: i64) -> bool {
        let mut inner = self.inner.write().await;

        match inner.index.get(device_id).copied() {
            Some(pos) => {
                inner.devices[pos].1.push(value);
                false
            }
            None => {
                let pos = inner.devices.len();
                inner.devices.push((device_id.to_owned(), vec![value]));
                inner.index.insert(device_id.to_owned(), pos);
                true
            }
        }
    }

    /// Return a copy of every reading recorded for `device_id`.
    pub async fn get(&self, device_id: &str) -> Result<Vec<i64>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .index
            .get(device_id)
            .map(|&pos| inner.devices[pos].1.clone())
            .ok_or_else(|| StoreError::NotFound(device_id.to_owned()))
    }

    /// Snapshot of all devices in insertion order, with totals and flags.
    pub async fn summary(&self) -> Vec<DeviceSummary> {
        self.inner
            .read()
            .await
            .devices
            .iter()
            .map(|(device_id, readings)| {
                let total: i128 = readings.iter().map(|&v| i128::from(v)).sum();
                DeviceSummary {
                    device_id: device_id.clone(),
                    readings: readings.clone(),
                    total,
                    exceeded: total > USAGE_THRESHOLD,
                }
            })
            .collect()
    }

    /// Number of known devices.
    pub async fn len(&self) -> usize {
        self.inner.read().await.devices.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = ReadingStore::new();
        assert!(store.is_empty().await);
        assert!(store.summary().await.is_empty());
        assert_eq!(
            store.get("dev1").await,
            Err(StoreError::NotFound("dev1".to_owned()))
        );
    }

    #[tokio::test]
    async fn append_preserves_arrival_order() {
        let store = ReadingStore::new();
        for v in [5, 3, 5, -2, 0] {
            store.append("dev1", v).await;
        }

        assert_eq!(store.get("dev1").await.unwrap(), vec![5, 3, 5, -2, 0]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn append_reports_first_reading_per_device() {
        let store = ReadingStore::new();
        assert!(store.append("dev1", 1).await);
        assert!(!store.append("dev1", 2).await);
        assert!(store.append("dev2", 3).await);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn get_is_idempotent() {
        let store = ReadingStore::new();
        store.append("dev1", 600).await;
        store.append("dev1", 500).await;

        let first = store.get("dev1").await.unwrap();
        let second = store.get("dev1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn different_devices_are_separate_entries() {
        let store = ReadingStore::new();
        store.append("dev1", 1).await;
        store.append("dev2", 2).await;
        store.append("dev1", 3).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("dev1").await.unwrap(), vec![1, 3]);
        assert_eq!(store.get("dev2").await.unwrap(), vec![2]);
        assert!(store.get("dev3").await.is_err());
    }

    #[tokio::test]
    async fn summary_keeps_insertion_order() {
        let store = ReadingStore::new();
        for id in ["zeta", "alpha", "mid", "alpha"] {
            store.append(id, 1).await;
        }

        let ids: Vec<String> = store
            .summary()
            .await
            .into_iter()
            .map(|row| row.device_id)
            .collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn summary_flags_totals_above_threshold_only() {
        let store = ReadingStore::new();
        store.append("over", 600).await;
        store.append("over", 500).await;
        store.append("exact", 1000).await;
        store.append("under", 999).await;

        let rows = store.summary().await;
        assert_eq!(rows[0].total, 1100);
        assert!(rows[0].exceeded);
        assert_eq!(rows[1].total, 1000);
        assert!(!rows[1].exceeded);
        assert!(!rows[2].exceeded);
    }

    #[tokio::test]
    async fn summary_total_does_not_overflow() {
        let store = ReadingStore::new();
        store.append("big", i64::MAX).await;
        store.append("big", i64::MAX).await;

        let rows = store.summary().await;
        assert_eq!(rows[0].total, 2 * i128::from(i64::MAX));
        assert!(rows[0].exceeded);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = ReadingStore::new();
        let clone = store.clone();

        store.append("dev1", 42).await;

        assert_eq!(clone.get("dev1").await.unwrap(), vec![42]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_lose_nothing() {
        let store = ReadingStore::new();

        let handles: Vec<_> = (0..8)
            .map(|task| {
                let store = store.clone();
                tokio::spawn(async move {
                    let device_id = format!("dev{}", task % 4);
                    for i in 0..100 {
                        store.append(&device_id, i).await;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 4);
        for row in store.summary().await {
            assert_eq!(row.readings.len(), 200);
            assert_eq!(row.total, 2 * (0..100i128).sum::<i128>());
        }
    }

    #[tokio::test]
    async fn sequential_appends_from_one_task_stay_ordered_under_contention() {
        let store = ReadingStore::new();
        let noise = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..500 {
                    store.append("noise", i).await;
                }
            })
        };

        for i in 0..500 {
            store.append("ordered", i).await;
        }
        noise.await.unwrap();

        let expected: Vec<i64> = (0..500).collect();
        assert_eq!(store.get("ordered").await.unwrap(), expected);
    }
}

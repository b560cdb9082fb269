//! Estimation history on top of the key/value store.

use chrono::{SecondsFormat, Utc};
use std::path::Path;

use crate::estimation::{CarbonEstimationResult, EstimationRecord};
use crate::observability::metrics;
use crate::storage::{KvStore, StoreResult};

/// Key prefix shared by every estimation record.
pub const RECORD_PREFIX: &str = "estimation-";

const ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Persistent log of saved estimations.
pub struct HistoryStore {
    kv: KvStore,
}

impl HistoryStore {
    pub async fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let store = Self {
            kv: KvStore::open(dir).await?,
        };
        metrics::record_history_size(store.len());
        Ok(store)
    }

    fn key_for(id: &str) -> String {
        format!("{}{}", RECORD_PREFIX, id)
    }

    /// Wrap `estimation` in a new record and persist it.
    pub async fn save(&self, estimation: CarbonEstimationResult) -> StoreResult<EstimationRecord> {
        let mut id = generate_id();
        while self.kv.contains(&Self::key_for(&id)) {
            id = generate_id();
        }

        let record = EstimationRecord {
            id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            estimation,
        };

        let value = serde_json::to_value(&record)?;
        self.kv.set(&Self::key_for(&record.id), value).await?;
        metrics::record_history_size(self.len());

        tracing::debug!(
            id = %record.id,
            emission_type = %record.estimation.emission_type,
            "Estimation saved"
        );
        Ok(record)
    }

    /// Every stored record, oldest first.
    ///
    /// Values under the record prefix that no longer decode are skipped.
    pub fn list(&self) -> Vec<EstimationRecord> {
        let mut records: Vec<EstimationRecord> = self
            .kv
            .entries()
            .into_iter()
            .filter(|(key, _)| key.starts_with(RECORD_PREFIX))
            .filter_map(|(key, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Ignoring undecodable record");
                    None
                }
            })
            .collect();

        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        records
    }

    pub fn get(&self, id: &str) -> Option<EstimationRecord> {
        let value = self.kv.get(&Self::key_for(id))?;
        serde_json::from_value(value).ok()
    }

    /// Delete every record. Returns how many were removed.
    pub async fn clear(&self) -> StoreResult<usize> {
        let mut removed = 0;
        for key in self.kv.keys() {
            if key.starts_with(RECORD_PREFIX) && self.kv.remove(&key).await? {
                removed += 1;
            }
        }
        metrics::record_history_size(self.len());

        tracing::info!(removed, "Estimation history cleared");
        Ok(removed)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.kv
            .keys()
            .iter()
            .filter(|key| key.starts_with(RECORD_PREFIX))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Base-36 millisecond timestamp followed by a random base-36 suffix.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);
    for _ in 0..ID_SUFFIX_LEN {
        id.push(BASE36[fastrand::usize(..BASE36.len())] as char);
    }
    id
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::EmissionType;
    use chrono::DateTime;
    use serde_json::json;

    fn result(kind: EmissionType, grams: f64) -> CarbonEstimationResult {
        CarbonEstimationResult {
            carbon_grams: grams,
            carbon_lbs: grams * 0.0022,
            carbon_kg: grams / 1000.0,
            carbon_mt: grams / 1_000_000.0,
            estimated_at: Utc::now(),
            source: "MockProvider".to_string(),
            emission_type: kind,
            original_input: json!({}),
        }
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1295), "zz");
    }

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        assert!(id.len() > ID_SUFFIX_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(generate_id(), generate_id());
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).await.unwrap();

        let saved = store.save(result(EmissionType::Electricity, 1000.0)).await.unwrap();
        assert!(saved.timestamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&saved.timestamp).is_ok());

        let fetched = store.get(&saved.id).unwrap();
        assert_eq!(fetched, saved);
        assert!(store.get("missing").is_none());
        assert!(dir
            .path()
            .join(format!("{}{}.json", RECORD_PREFIX, saved.id))
            .exists());
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).await.unwrap();

        let first = store.save(result(EmissionType::Electricity, 1000.0)).await.unwrap();
        let second = store.save(result(EmissionType::Flight, 3000.0)).await.unwrap();
        // Unrelated keys in the same directory are not records.
        store.kv.set("settings", json!({ "theme": "dark" })).await.unwrap();

        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|r| r.id == first.id));
        assert!(listed.iter().any(|r| r.id == second.id));
        assert!(listed[0].timestamp <= listed[1].timestamp);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_removes_only_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).await.unwrap();

        store.save(result(EmissionType::Vehicle, 2000.0)).await.unwrap();
        store.save(result(EmissionType::Vehicle, 2000.0)).await.unwrap();
        store.kv.set("settings", json!(true)).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.list().is_empty());
        assert!(store.is_empty());
        assert!(store.kv.get("settings").is_some());
        assert_eq!(store.clear().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let saved = {
            let store = HistoryStore::open(dir.path()).await.unwrap();
            store.save(result(EmissionType::Flight, 3000.0)).await.unwrap()
        };

        let reopened = HistoryStore::open(dir.path()).await.unwrap();
        let listed = reopened.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
        assert_eq!(listed[0].timestamp, saved.timestamp);
        assert_eq!(listed[0].estimation.carbon_grams, 3000.0);
        assert_eq!(listed[0].estimation.emission_type, EmissionType::Flight);
        assert!(reopened.get(&saved.id).is_some());
    }
}

use crate::common::DomainResult;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Versioned envelope around a serialized aggregate, as written to a
/// key-value memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: Uuid,
    pub aggregate_id: String,
    pub aggregate_type: String,
    pub aggregate_version: u64,
    pub snapshot_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new<T: Serialize>(
        aggregate_id: &str,
        aggregate_type: &str,
        aggregate_version: u64,
        aggregate_data: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            snapshot_id: Uuid::new_v4(),
            aggregate_id: aggregate_id.to_string(),
            aggregate_type: aggregate_type.to_string(),
            aggregate_version,
            snapshot_data: serde_json::to_value(aggregate_data)?,
            created_at: Utc::now(),
        })
    }

    pub fn to_bytes(&self) -> DomainResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> DomainResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decode the payload into the aggregate type it was taken from.
    pub fn restore<T: DeserializeOwned>(&self) -> DomainResult<T> {
        Ok(serde_json::from_value(self.snapshot_data.clone())?)
    }
}

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use shared::{
    domain::{Address, CounterSnapshot, ObjectId},
    error::CounterError,
    protocol::ObjectData,
};
use tracing::{debug, warn};

use crate::ObjectReader;

const MOVE_OBJECT: &str = "moveObject";

/// What the counter view can show for the current object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotState {
    Loading,
    Error(String),
    NotFound,
    /// The object exists; `None` when its content is not a counter.
    Ready(Option<CounterSnapshot>),
}

impl SnapshotState {
    pub fn snapshot(&self) -> Option<&CounterSnapshot> {
        match self {
            SnapshotState::Ready(snapshot) => snapshot.as_ref(),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Option<CounterSnapshot>, CounterError> {
        match self {
            SnapshotState::Ready(snapshot) => Ok(snapshot),
            SnapshotState::NotFound => Err(CounterError::NotFound),
            SnapshotState::Error(message) => Err(CounterError::TransientFetch(message)),
            SnapshotState::Loading => Err(CounterError::TransientFetch(
                "snapshot has not been fetched yet".to_string(),
            )),
        }
    }
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

/// Reads `{ value, owner }` out of a Move object. Anything that is not a
/// Move object with those fields yields `None`.
pub fn project_counter_fields(data: &ObjectData) -> Option<CounterSnapshot> {
    let content = data.content.as_ref()?;
    if content.data_type != MOVE_OBJECT {
        return None;
    }
    let fields = content.fields.as_ref()?.as_object()?;
    let value = parse_u64(fields.get("value")?)?;
    let owner = fields.get("owner")?.as_str()?;
    Some(CounterSnapshot {
        value,
        owner: Address::new(owner),
    })
}

/// Holds the last fetched state of one counter.
pub struct SnapshotReader {
    object_id: ObjectId,
    reader: Arc<dyn ObjectReader>,
    state: Mutex<SnapshotState>,
}

impl SnapshotReader {
    pub fn new(object_id: ObjectId, reader: Arc<dyn ObjectReader>) -> Self {
        Self {
            object_id,
            reader,
            state: Mutex::new(SnapshotState::Loading),
        }
    }

    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    pub fn current(&self) -> SnapshotState {
        self.lock_state().clone()
    }

    /// Fetches the object again and replaces the displayed state.
    pub async fn refetch(&self) -> SnapshotState {
        let state = match self.reader.get_object(&self.object_id).await {
            Err(err) => {
                warn!(object_id = %self.object_id, error = %err, "failed to fetch counter");
                SnapshotState::Error(err.to_string())
            }
            Ok(response) => match response.data {
                None => {
                    let code = response.error.map(|error| error.code);
                    debug!(object_id = %self.object_id, ?code, "counter not found");
                    SnapshotState::NotFound
                }
                Some(data) => SnapshotState::Ready(project_counter_fields(&data)),
            },
        };
        *self.lock_state() = state.clone();
        state
    }

    fn lock_state(&self) -> MutexGuard<'_, SnapshotState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "tests/snapshot_tests.rs"]
mod tests;

//! Resolves the counter the client operates on, either from the persisted
//! location fragment or by creating a fresh one on chain.

use std::sync::Arc;

use shared::{
    domain::{is_well_formed_hex_id, ObjectId, PackageId, HEX_ID_LEN, HEX_PREFIX},
    error::CounterError,
    protocol::{MoveCall, TransactionBlockResponse, CREATE_ENTRY_POINT},
};
use tracing::{debug, info, warn};

use crate::{SignAndExecute, TransactionResponseOptions, TransactionWaiter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ObjectId),
    NeedsCreate,
}

impl Resolution {
    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            Resolution::Resolved(id) => Some(id),
            Resolution::NeedsCreate => None,
        }
    }
}

pub fn validate_package_id(raw: &str) -> Result<PackageId, CounterError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CounterError::Configuration(
            "Counter package ID is not configured for this network.".to_string(),
        ));
    }
    if !is_well_formed_hex_id(raw) {
        return Err(CounterError::Configuration(format!(
            "Invalid package ID format. Should be a {HEX_ID_LEN}-character hex string starting with {HEX_PREFIX}"
        )));
    }
    Ok(PackageId::new(raw))
}

type Extractor = fn(&TransactionBlockResponse) -> Option<ObjectId>;

/// Result channels checked for the new object, in priority order.
const EXTRACTORS: [(&str, Extractor); 3] = [
    ("effects.created", from_created_effects),
    ("objectChanges", from_object_changes),
    ("effects.mutated", from_mutated_effects),
];

fn non_empty(id: &ObjectId) -> Option<ObjectId> {
    (!id.as_str().is_empty()).then(|| id.clone())
}

fn from_created_effects(response: &TransactionBlockResponse) -> Option<ObjectId> {
    let created = response.effects.as_ref()?.created.first()?;
    non_empty(&created.reference.object_id)
}

fn from_object_changes(response: &TransactionBlockResponse) -> Option<ObjectId> {
    let change = response
        .object_changes
        .as_ref()?
        .iter()
        .find(|change| change.kind == "created")?;
    non_empty(change.object_id.as_ref()?)
}

fn from_mutated_effects(response: &TransactionBlockResponse) -> Option<ObjectId> {
    let mutated = response.effects.as_ref()?.mutated.first()?;
    non_empty(&mutated.reference.object_id)
}

/// Finds the id of the object a `create` call produced. The first channel
/// that yields an id wins.
pub fn extract_created_object_id(
    response: &TransactionBlockResponse,
) -> Result<ObjectId, CounterError> {
    for (channel, extractor) in EXTRACTORS {
        if let Some(object_id) = extractor(response) {
            debug!(%object_id, channel, "found created object id");
            return Ok(object_id);
        }
    }
    debug!(digest = %response.digest, "no object id found in transaction result");
    Err(CounterError::Extraction)
}

pub struct ObjectLocator {
    package_id: String,
    signer: Arc<dyn SignAndExecute>,
    waiter: Arc<dyn TransactionWaiter>,
}

impl ObjectLocator {
    pub fn new(
        package_id: impl Into<String>,
        signer: Arc<dyn SignAndExecute>,
        waiter: Arc<dyn TransactionWaiter>,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            signer,
            waiter,
        }
    }

    /// Adopts the id in `location` when it is well formed. No network call.
    pub fn resolve(location: &str) -> Resolution {
        match ObjectId::from_fragment(location) {
            Some(id) => Resolution::Resolved(id),
            None => Resolution::NeedsCreate,
        }
    }

    /// Creates a new counter and returns its id. The caller is responsible
    /// for persisting the id.
    pub async fn create(&self) -> Result<ObjectId, CounterError> {
        let package_id = validate_package_id(&self.package_id)?;
        let call = MoveCall::counter(&package_id, CREATE_ENTRY_POINT, Vec::new());

        let digest = self
            .signer
            .sign_and_execute(call)
            .await
            .map_err(|err| {
                warn!(error = %err, "create transaction failed");
                CounterError::Transaction(err.to_string())
            })?;
        debug!(%digest, "create transaction submitted");

        let response = self
            .waiter
            .wait_for_transaction(&digest, TransactionResponseOptions::effects_and_changes())
            .await
            .map_err(|err| {
                warn!(%digest, error = %err, "failed to fetch create transaction result");
                CounterError::Transaction(format!("Failed to process transaction: {err}"))
            })?;
        if let Some(error) = response.execution_error() {
            warn!(%digest, %error, "create transaction aborted");
            return Err(CounterError::Transaction(error));
        }

        let object_id = extract_created_object_id(&response)?;
        info!(%digest, %object_id, "counter created");
        Ok(object_id)
    }
}

#[cfg(test)]
#[path = "tests/locator_tests.rs"]
mod tests;

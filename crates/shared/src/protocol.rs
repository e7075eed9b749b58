use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Address, Network, ObjectId, PackageId, TransactionDigest};

pub const COUNTER_MODULE: &str = "counter";
pub const CREATE_ENTRY_POINT: &str = "create";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    Object(ObjectId),
    PureU64(u64),
}

/// A single logical call handed to the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    pub target: String,
    pub arguments: Vec<CallArg>,
}

impl MoveCall {
    pub fn counter(package_id: &PackageId, entry_point: &str, arguments: Vec<CallArg>) -> Self {
        Self {
            target: format!("{package_id}::{COUNTER_MODULE}::{entry_point}"),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignAndExecuteRequest {
    pub network: Network,
    pub calls: Vec<MoveCall>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignAndExecuteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<TransactionDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountResponse {
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "objectId")]
    pub object_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnedObjectRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Value>,
    pub reference: ObjectRef,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionEffects {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    #[serde(default)]
    pub created: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub mutated: Vec<OwnedObjectRef>,
}

/// One entry of `objectChanges`. Only the fields the client reads are kept;
/// `published` entries carry no `objectId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectChange {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "objectId", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ObjectId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionBlockResponse {
    pub digest: TransactionDigest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<TransactionEffects>,
    #[serde(
        rename = "objectChanges",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub object_changes: Option<Vec<ObjectChange>>,
}

impl TransactionBlockResponse {
    /// The abort or execution error reported by the effects, if execution failed.
    pub fn execution_error(&self) -> Option<String> {
        let status = self.effects.as_ref()?.status.as_ref()?;
        if status.status == "success" {
            return None;
        }
        Some(
            status
                .error
                .clone()
                .unwrap_or_else(|| format!("execution status {}", status.status)),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectContent {
    #[serde(rename = "dataType")]
    pub data_type: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectData {
    #[serde(rename = "objectId")]
    pub object_id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ObjectContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectResponseError {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ObjectId>,
}

/// Result of `sui_getObject`: either `data` or an `error` such as `notExists`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ObjectData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ObjectResponseError>,
}

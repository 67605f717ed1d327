use crate::runtime::model::{OriginKind, SnapshotRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySnapshotRequest {
    pub source_arn: String,
    pub target_identifier: String,
    pub kms_key_id: Option<String>,
    pub copy_tags: bool,
}

// NotFound is the expected control-flow signal from the existence check;
// everything else is a real service failure and must stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound,
    Service(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("snapshot not found"),
            Self::Service(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for StoreError {}

pub trait SnapshotStore {
    fn list_snapshots(&self, origin: OriginKind) -> Result<Vec<SnapshotRecord>, StoreError>;
    fn find_snapshot(&self, identifier: &str) -> Result<SnapshotRecord, StoreError>;
    fn copy_snapshot(&self, request: &CopySnapshotRequest) -> Result<(), StoreError>;
    fn delete_snapshot(&self, identifier: &str) -> Result<(), StoreError>;
}

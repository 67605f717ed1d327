use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginKind {
    Manual,
    Shared,
}

impl OriginKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Shared => "shared",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    Available,
    Creating,
    Failed,
    Other(String),
}

impl SnapshotStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "available" => Self::Available,
            "creating" => Self::Creating,
            "failed" => Self::Failed,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "available",
            Self::Creating => "creating",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    // A copy stops moving once it is available or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Available | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub identifier: String,
    pub instance_id: String,
    pub arn: String,
    pub status: SnapshotStatus,
    pub created_at: DateTime<Utc>,
    pub kms_key_id: Option<String>,
}

impl SnapshotRecord {
    // Shared snapshots must be addressed by ARN; manual ones by identifier.
    pub fn retention_key(&self, origin: OriginKind) -> &str {
        match origin {
            OriginKind::Manual => &self.identifier,
            OriginKind::Shared => &self.arn,
        }
    }
}

pub fn available_for_instance(
    snapshots: Vec<SnapshotRecord>,
    instance_id: &str,
) -> Vec<SnapshotRecord> {
    snapshots
        .into_iter()
        .filter(|snapshot| snapshot.status.is_available() && snapshot.instance_id == instance_id)
        .collect()
}

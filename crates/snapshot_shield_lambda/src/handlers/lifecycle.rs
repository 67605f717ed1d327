use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::adapters::snapshot_store::{CopySnapshotRequest, SnapshotStore, StoreError};
use crate::adapters::wait::Sleeper;
use crate::runtime::config::{LifecycleConfig, LogLevel};
use crate::runtime::model::{available_for_instance, OriginKind, SnapshotRecord, SnapshotStatus};
use crate::runtime::naming::copy_snapshot_name;
use crate::runtime::retention::RetentionSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub manual_snapshots_pruned: usize,
    pub shared_snapshots_pruned: usize,
    pub shared_snapshots_available: usize,
    pub snapshots_copied: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    NoSnapshotsFound { origin: OriginKind },
    CopyVerificationFailed { target: String, status: SnapshotStatus },
    Store(StoreError),
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSnapshotsFound { origin } => {
                write!(f, "no {} snapshots found", origin.as_str())
            }
            Self::CopyVerificationFailed { target, status } => {
                write!(
                    f,
                    "copy for {target} finished with status {}",
                    status.as_str()
                )
            }
            Self::Store(error) => write!(f, "snapshot store request failed: {error}"),
        }
    }
}

impl std::error::Error for LifecycleError {}

impl From<StoreError> for LifecycleError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

pub struct SnapshotLifecycleManager<'a, S: SnapshotStore, P: Sleeper> {
    store: &'a S,
    sleeper: &'a P,
    config: &'a LifecycleConfig,
}

impl<'a, S: SnapshotStore, P: Sleeper> SnapshotLifecycleManager<'a, S, P> {
    pub fn new(store: &'a S, sleeper: &'a P, config: &'a LifecycleConfig) -> Self {
        Self {
            store,
            sleeper,
            config,
        }
    }

    pub fn run(&self) -> Result<MaintenanceReport, LifecycleError> {
        let manual_snapshots_pruned = self.prune(OriginKind::Manual)?;
        let shared_snapshots_pruned = self.prune(OriginKind::Shared)?;
        let shared_snapshots_available = self.list_shared()?.len();
        let snapshots_copied = self.copy_missing()?;

        let report = MaintenanceReport {
            manual_snapshots_pruned,
            shared_snapshots_pruned,
            shared_snapshots_available,
            snapshots_copied,
        };
        self.log_info(
            "maintenance_completed",
            json!({
                "source_instance_id": self.config.source_instance_id.clone(),
                "manual_snapshots_pruned": report.manual_snapshots_pruned,
                "shared_snapshots_pruned": report.shared_snapshots_pruned,
                "shared_snapshots_available": report.shared_snapshots_available,
                "snapshots_copied": report.snapshots_copied,
            }),
        );
        Ok(report)
    }

    // An empty unfiltered listing is an error; an empty filtered result is not.
    pub fn list_shared(&self) -> Result<Vec<SnapshotRecord>, LifecycleError> {
        let listed = self.store.list_snapshots(OriginKind::Shared)?;
        if listed.is_empty() {
            self.log_error("no_snapshots_found", json!({"origin": "shared"}));
            return Err(LifecycleError::NoSnapshotsFound {
                origin: OriginKind::Shared,
            });
        }

        Ok(available_for_instance(
            listed,
            &self.config.source_instance_id,
        ))
    }

    pub fn copy_missing(&self) -> Result<usize, LifecycleError> {
        let candidates = self.list_shared()?;
        let mut snapshots_copied = 0usize;

        for snapshot in &candidates {
            let target = copy_snapshot_name(&self.config.source_instance_id, snapshot.created_at);
            self.log_info("copy_check_started", json!({"target": target.clone()}));

            match self.store.find_snapshot(&target) {
                Ok(_) => {
                    self.log_info("copy_already_present", json!({"target": target}));
                    continue;
                }
                Err(StoreError::NotFound) => {}
                Err(error) => return Err(error.into()),
            }

            self.log_info(
                "copy_started",
                json!({
                    "source_arn": snapshot.arn.clone(),
                    "target": target.clone(),
                }),
            );
            self.store.copy_snapshot(&CopySnapshotRequest {
                source_arn: snapshot.arn.clone(),
                target_identifier: target.clone(),
                kms_key_id: snapshot.kms_key_id.clone(),
                copy_tags: false,
            })?;

            self.wait_for_copy(&target)?;

            let copied = self.store.find_snapshot(&target)?;
            if !copied.status.is_available() {
                self.log_error(
                    "copy_verification_failed",
                    json!({
                        "target": target.clone(),
                        "status": copied.status.as_str(),
                    }),
                );
                return Err(LifecycleError::CopyVerificationFailed {
                    target,
                    status: copied.status,
                });
            }

            self.log_info("copy_completed", json!({"target": target}));
            snapshots_copied += 1;
        }

        self.log_info(
            "copy_pass_completed",
            json!({"snapshots_copied": snapshots_copied}),
        );
        Ok(snapshots_copied)
    }

    pub fn prune(&self, origin: OriginKind) -> Result<usize, LifecycleError> {
        let listed = self.store.list_snapshots(origin)?;
        if listed.is_empty() {
            self.log_error("no_snapshots_found", json!({"origin": origin.as_str()}));
            return Err(LifecycleError::NoSnapshotsFound { origin });
        }

        let retention = RetentionSet::build(&listed, origin, &self.config.source_instance_id);
        let doomed = retention.prune_plan(self.config.retention_count);
        if doomed.is_empty() {
            self.log_info(
                "prune_skipped",
                json!({
                    "origin": origin.as_str(),
                    "available": retention.total_available(),
                }),
            );
            return Ok(0);
        }

        let mut snapshots_pruned = 0usize;
        for key in &doomed {
            self.log_info(
                "snapshot_removal_started",
                json!({
                    "origin": origin.as_str(),
                    "snapshot": key.clone(),
                }),
            );
            // Deletion stays fire-and-forget: a failed delete is logged but
            // neither retried nor fatal to the pass.
            match self.store.delete_snapshot(key) {
                Ok(()) => snapshots_pruned += 1,
                Err(error) => self.log_error(
                    "snapshot_removal_failed",
                    json!({
                        "origin": origin.as_str(),
                        "snapshot": key.clone(),
                        "error": error.to_string(),
                    }),
                ),
            }
        }

        self.log_info(
            "prune_completed",
            json!({
                "origin": origin.as_str(),
                "snapshots_pruned": snapshots_pruned,
            }),
        );
        Ok(snapshots_pruned)
    }

    // Polls until the copy reaches a terminal state or the attempt budget
    // runs out; the mandatory re-fetch in copy_missing decides the outcome.
    fn wait_for_copy(&self, target: &str) -> Result<(), LifecycleError> {
        let interval = Duration::from_secs(self.config.wait.interval_secs);

        for attempt in 1..=self.config.wait.max_attempts {
            match self.store.find_snapshot(target) {
                Ok(snapshot) if snapshot.status.is_terminal() => return Ok(()),
                // The copy may not be visible immediately after the request.
                Ok(_) | Err(StoreError::NotFound) => {}
                Err(error) => return Err(error.into()),
            }

            if attempt < self.config.wait.max_attempts {
                self.sleeper.sleep(interval);
            }
        }

        Ok(())
    }

    fn log_info(&self, event: &str, details: serde_json::Value) {
        if self.config.log_level < LogLevel::Info {
            return;
        }
        eprintln!(
            "{}",
            json!({
                "component": "snapshot_lifecycle",
                "event": event,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "details": details,
            })
        );
    }

    fn log_error(&self, event: &str, details: serde_json::Value) {
        eprintln!(
            "{}",
            json!({
                "component": "snapshot_lifecycle",
                "level": "error",
                "event": event,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "details": details,
            })
        );
    }
}

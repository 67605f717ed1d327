use std::time::Duration;

use chrono::{DateTime, Utc};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use snapshot_shield_lambda::adapters::snapshot_store::{
    CopySnapshotRequest, SnapshotStore, StoreError,
};
use snapshot_shield_lambda::adapters::wait::Sleeper;
use snapshot_shield_lambda::handlers::lifecycle::{MaintenanceReport, SnapshotLifecycleManager};
use snapshot_shield_lambda::runtime::config::{
    normalize_config, LifecycleConfig, LogLevel, WaitPolicy, DEFAULT_RETENTION_COUNT,
    DEFAULT_WAIT_INTERVAL_SECS, DEFAULT_WAIT_MAX_ATTEMPTS,
};
use snapshot_shield_lambda::runtime::model::{OriginKind, SnapshotRecord, SnapshotStatus};

const DEFAULT_TARGET_REGION: &str = "us-west-2";

struct RdsSnapshotStore {
    rds_client: aws_sdk_rds::Client,
}

impl SnapshotStore for RdsSnapshotStore {
    fn list_snapshots(&self, origin: OriginKind) -> Result<Vec<SnapshotRecord>, StoreError> {
        let client = self.rds_client.clone();
        let snapshot_type = origin.as_str();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut records = Vec::new();
                let mut marker: Option<String> = None;

                loop {
                    let response = client
                        .describe_db_snapshots()
                        .snapshot_type(snapshot_type)
                        .include_shared(true)
                        .include_public(false)
                        .set_marker(marker)
                        .send()
                        .await
                        .map_err(|error| {
                            StoreError::Service(format!(
                                "failed to list {snapshot_type} snapshots: {error}"
                            ))
                        })?;

                    records.extend(response.db_snapshots().iter().filter_map(snapshot_record));
                    marker = response.marker().map(str::to_string);
                    if marker.is_none() {
                        break;
                    }
                }

                Ok(records)
            })
        })
    }

    fn find_snapshot(&self, identifier: &str) -> Result<SnapshotRecord, StoreError> {
        let client = self.rds_client.clone();
        let target = identifier.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let response = client
                    .describe_db_snapshots()
                    .db_snapshot_identifier(&target)
                    .snapshot_type("manual")
                    .include_shared(true)
                    .include_public(false)
                    .send()
                    .await
                    .map_err(|error| match error.as_service_error() {
                        Some(service_error) if service_error.is_db_snapshot_not_found_fault() => {
                            StoreError::NotFound
                        }
                        _ => StoreError::Service(format!(
                            "failed to look up snapshot {target}: {error}"
                        )),
                    })?;

                response
                    .db_snapshots()
                    .iter()
                    .filter_map(snapshot_record)
                    .next()
                    .ok_or(StoreError::NotFound)
            })
        })
    }

    fn copy_snapshot(&self, request: &CopySnapshotRequest) -> Result<(), StoreError> {
        let client = self.rds_client.clone();
        let request = request.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .copy_db_snapshot()
                    .source_db_snapshot_identifier(&request.source_arn)
                    .target_db_snapshot_identifier(&request.target_identifier)
                    .set_kms_key_id(request.kms_key_id.clone())
                    .copy_tags(request.copy_tags)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        StoreError::Service(format!(
                            "failed to copy snapshot to {}: {error}",
                            request.target_identifier
                        ))
                    })
            })
        })
    }

    fn delete_snapshot(&self, identifier: &str) -> Result<(), StoreError> {
        let client = self.rds_client.clone();
        let target = identifier.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_db_snapshot()
                    .db_snapshot_identifier(&target)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        StoreError::Service(format!("failed to delete snapshot {target}: {error}"))
                    })
            })
        })
    }
}

// Snapshots missing identity or creation-time fields cannot be named, keyed,
// or retained; they are dropped at this boundary.
fn snapshot_record(snapshot: &aws_sdk_rds::types::DbSnapshot) -> Option<SnapshotRecord> {
    Some(SnapshotRecord {
        identifier: snapshot.db_snapshot_identifier()?.to_string(),
        instance_id: snapshot.db_instance_identifier()?.to_string(),
        arn: snapshot.db_snapshot_arn()?.to_string(),
        status: SnapshotStatus::parse(snapshot.status()?),
        created_at: snapshot.snapshot_create_time().and_then(chrono_time)?,
        kms_key_id: snapshot.kms_key_id().map(str::to_string),
    })
}

fn chrono_time(value: &aws_sdk_rds::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

struct BlockingSleeper;

impl Sleeper for BlockingSleeper {
    fn sleep(&self, duration: Duration) {
        tokio::task::block_in_place(|| std::thread::sleep(duration));
    }
}

fn env_usize(name: &str, default: usize) -> Result<usize, Error> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::from(format!("{name} must be an unsigned integer, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64, Error> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::from(format!("{name} must be an unsigned integer, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

fn config_from_env() -> Result<LifecycleConfig, Error> {
    let source_instance_id = std::env::var("SNAPSHOT_SOURCE_INSTANCE")
        .map_err(|_| Error::from("SNAPSHOT_SOURCE_INSTANCE must be configured"))?;

    let config = LifecycleConfig {
        source_instance_id,
        retention_count: env_usize("SNAPSHOT_RETENTION_COUNT", DEFAULT_RETENTION_COUNT)?,
        wait: WaitPolicy {
            interval_secs: env_u64("SNAPSHOT_WAIT_INTERVAL_SECS", DEFAULT_WAIT_INTERVAL_SECS)?,
            max_attempts: env_usize("SNAPSHOT_WAIT_MAX_ATTEMPTS", DEFAULT_WAIT_MAX_ATTEMPTS)?,
        },
        log_level: LogLevel::parse(std::env::var("LOG_LEVEL").ok().as_deref()),
    };

    normalize_config(config).map_err(|error| Error::from(error.message().to_string()))
}

// The scheduled-event payload carries nothing this handler needs.
async fn handle_request(_event: LambdaEvent<Value>) -> Result<MaintenanceReport, Error> {
    let config = config_from_env()?;

    let region = std::env::var("SNAPSHOT_TARGET_REGION")
        .unwrap_or_else(|_| DEFAULT_TARGET_REGION.to_string());
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region))
        .load()
        .await;

    let store = RdsSnapshotStore {
        rds_client: aws_sdk_rds::Client::new(&sdk_config),
    };
    let sleeper = BlockingSleeper;

    let manager = SnapshotLifecycleManager::new(&store, &sleeper, &config);
    manager.run().map_err(|error| Error::from(error.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}

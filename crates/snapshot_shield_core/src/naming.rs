use chrono::{DateTime, Utc};

pub const COPY_NAME_TAG: &str = "shield";

// The timestamp is the source snapshot's creation time, so re-runs derive the
// same target name and can skip snapshots that were already copied.
pub fn copy_snapshot_name(instance_id: &str, created_at: DateTime<Utc>) -> String {
    format!(
        "{instance_id}-{COPY_NAME_TAG}-{}",
        created_at.format("%Y%m%d%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn builds_copy_name_from_instance_and_creation_time() {
        let created_at = Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("timestamp should be unambiguous");

        assert_eq!(
            copy_snapshot_name("prd-rds", created_at),
            "prd-rds-shield-20240102030405"
        );
    }

    #[test]
    fn copy_name_is_stable_across_invocations() {
        let created_at = Utc
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 59)
            .single()
            .expect("timestamp should be unambiguous");

        assert_eq!(
            copy_snapshot_name("stg-rds", created_at),
            copy_snapshot_name("stg-rds", created_at)
        );
    }
}

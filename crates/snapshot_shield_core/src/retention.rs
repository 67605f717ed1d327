use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::{OriginKind, SnapshotRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionSet {
    groups: BTreeMap<String, BTreeMap<String, DateTime<Utc>>>,
    total_available: usize,
}

impl RetentionSet {
    pub fn build(snapshots: &[SnapshotRecord], origin: OriginKind, instance_id: &str) -> Self {
        let mut groups: BTreeMap<String, BTreeMap<String, DateTime<Utc>>> = BTreeMap::new();
        let mut total_available = 0usize;

        for snapshot in snapshots {
            if !snapshot.status.is_available() || snapshot.instance_id != instance_id {
                continue;
            }

            groups
                .entry(snapshot.instance_id.clone())
                .or_default()
                .insert(
                    snapshot.retention_key(origin).to_string(),
                    snapshot.created_at,
                );
            total_available += 1;
        }

        Self {
            groups,
            total_available,
        }
    }

    pub fn total_available(&self) -> usize {
        self.total_available
    }

    pub fn is_empty(&self) -> bool {
        self.total_available == 0
    }

    // The threshold compares the global available count, not the per-group
    // count. With the instance filter above there is exactly one group, so
    // the two counters coincide.
    pub fn prune_plan(&self, retention_count: usize) -> Vec<String> {
        let mut doomed = Vec::new();
        if self.total_available <= retention_count {
            return doomed;
        }

        for entries in self.groups.values() {
            let mut ordered: Vec<(&String, &DateTime<Utc>)> = entries.iter().collect();
            ordered.sort_by(|left, right| right.1.cmp(left.1));
            doomed.extend(
                ordered
                    .into_iter()
                    .skip(retention_count)
                    .map(|(key, _)| key.clone()),
            );
        }

        doomed
    }
}

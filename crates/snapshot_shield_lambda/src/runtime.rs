pub use snapshot_shield_core::config;
pub use snapshot_shield_core::model;
pub use snapshot_shield_core::naming;
pub use snapshot_shield_core::retention;

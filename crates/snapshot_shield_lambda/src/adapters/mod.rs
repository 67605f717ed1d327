pub mod snapshot_store;
pub mod wait;

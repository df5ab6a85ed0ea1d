//! Lockfile types and persistence.
//!
//! Represents recorded install state used for change detection and updates.

pub mod store;
pub mod types;

pub use store::LockfileStore;
pub use types::{LOCKFILE_VERSION, LockedPackage, Lockfile};

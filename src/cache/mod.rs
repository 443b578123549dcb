//! Cache module for the full employee list
//!
//! This module provides the in-memory cache the service reads derived views
//! from. It holds one snapshot for the lifetime of the process; nothing is
//! written to disk. Create and delete never touch it, so the snapshot
//! reflects the last full list fetch only.

mod manager;

pub use manager::{CachedData, EmployeeCache, ALL_EMPLOYEES_KEY};

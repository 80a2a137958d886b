//! Baseline module for the Synheart Rhythm Agent.
//!
//! This module provides the store abstraction the analysis core reads its
//! historical reference from, plus memory and JSON-file implementations.

pub mod registry;
pub mod store;

// Re-export commonly used types
pub use registry::{
    baseline_path, validate_user_id, BaselineRegistry, UserLock, MAX_USER_ID_LEN,
};
pub use store::{
    BaselineError, BaselineSnapshot, BaselineStore, FileBaselineStore, MemoryBaselineStore,
};

//! Service layer for the dashboard backend.
//! - `storage`: atomic JSON document persistence.
//! - `catalog`: CRUD over the service collection on top of storage.
//! - `runtime`: startup environment checks.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod catalog;

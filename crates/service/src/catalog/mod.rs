//! The dashboard's service catalog: record types, the file-backed
//! `ServiceCatalog` and the `CatalogStore` abstraction used by the HTTP layer.

pub mod domain;
pub mod service;
pub mod store;

pub use domain::{NewService, ServiceCollection, ServicePatch, ServiceRecord, UNCATEGORIZED};
pub use service::ServiceCatalog;
pub use store::CatalogStore;

use std::{path::PathBuf, sync::Arc};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::domain::{NewService, ServiceCollection, ServicePatch, ServiceRecord};
use crate::errors::ServiceError;
use crate::storage::json_document_store::JsonDocumentStore;

/// CRUD over the dashboard's service collection.
///
/// Every call reads the document from disk; mutations hold `write_lock` across
/// load, mutate and save so concurrent writers cannot lose each other's updates.
/// Readers take no lock and rely on the store's atomic replace.
pub struct ServiceCatalog {
    store: JsonDocumentStore<ServiceCollection>,
    write_lock: Mutex<()>,
}

impl ServiceCatalog {
    /// Open the catalog backed by `path`, creating an empty document if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonDocumentStore::<ServiceCollection>::open(path).await?;
        info!(path = %store.path().display(), "service catalog opened");
        Ok(Arc::new(Self { store, write_lock: Mutex::new(()) }))
    }

    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }

    /// All services in stored order.
    pub async fn list(&self) -> Result<Vec<ServiceRecord>, ServiceError> {
        Ok(self.store.load().await?.services)
    }

    pub async fn get(&self, id: &str) -> Result<Option<ServiceRecord>, ServiceError> {
        let collection = self.store.load().await?;
        Ok(collection.services.into_iter().find(|s| s.id == id))
    }

    /// Validate, assign an id when none was supplied, append and persist.
    pub async fn create(&self, input: NewService) -> Result<ServiceRecord, ServiceError> {
        input.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut collection = self.store.load().await?;

        let id = match input.requested_id() {
            Some(requested) => {
                if collection.contains_id(requested) {
                    warn!(id = %requested, "rejected duplicate service id");
                    return Err(ServiceError::Conflict(format!("service id {requested} already exists")));
                }
                requested.to_string()
            }
            None => fresh_id(&collection),
        };

        let record = input.into_record(id);
        collection.services.push(record.clone());
        self.store.save(&collection).await?;
        info!(id = %record.id, name = %record.name, count = collection.services.len(), "service created");
        Ok(record)
    }

    /// Shallow-merge `patch` into the record with `id`, keeping its position.
    pub async fn update(&self, id: &str, patch: ServicePatch) -> Result<ServiceRecord, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.store.load().await?;

        let idx = collection.position(id).ok_or_else(|| ServiceError::not_found("service"))?;
        let mut merged = collection.services[idx].clone();
        patch.apply_to(&mut merged)?;
        collection.services[idx] = merged.clone();

        self.store.save(&collection).await?;
        info!(id = %merged.id, "service updated");
        Ok(merged)
    }

    /// Remove the record with `id`; returns whether it existed. Nothing is written when it did not.
    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut collection = self.store.load().await?;

        let before = collection.services.len();
        collection.services.retain(|s| s.id != id);
        if collection.services.len() == before {
            debug!(id = %id, "delete of unknown service");
            return Ok(false);
        }

        self.store.save(&collection).await?;
        info!(id = %id, count = collection.services.len(), "service deleted");
        Ok(true)
    }
}

fn fresh_id(collection: &ServiceCollection) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !collection.contains_id(&id) {
            return id;
        }
    }
}

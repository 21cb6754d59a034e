use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::domain::{NewService, ServicePatch, ServiceRecord};
use crate::catalog::service::ServiceCatalog;
use crate::errors::ServiceError;

/// Trait abstraction over the service collection, so the HTTP layer can hold
/// a `dyn CatalogStore` instead of the file-backed implementation.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list(&self) -> Result<Vec<ServiceRecord>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<ServiceRecord>, ServiceError>;
    async fn create(&self, input: NewService) -> Result<ServiceRecord, ServiceError>;
    async fn update(&self, id: &str, patch: ServicePatch) -> Result<ServiceRecord, ServiceError>;
    async fn delete(&self, id: &str) -> Result<bool, ServiceError>;
}

#[async_trait]
impl CatalogStore for ServiceCatalog {
    async fn list(&self) -> Result<Vec<ServiceRecord>, ServiceError> { ServiceCatalog::list(self).await }
    async fn get(&self, id: &str) -> Result<Option<ServiceRecord>, ServiceError> { ServiceCatalog::get(self, id).await }
    async fn create(&self, input: NewService) -> Result<ServiceRecord, ServiceError> { ServiceCatalog::create(self, input).await }
    async fn update(&self, id: &str, patch: ServicePatch) -> Result<ServiceRecord, ServiceError> { ServiceCatalog::update(self, id, patch).await }
    async fn delete(&self, id: &str) -> Result<bool, ServiceError> { ServiceCatalog::delete(self, id).await }
}

/// Convert the concrete catalog into the trait object used by routes.
pub fn into_dyn(catalog: Arc<ServiceCatalog>) -> Arc<dyn CatalogStore> {
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trait_object_dispatches_to_catalog() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir()
            .join(format!("catalog_store_{}", uuid::Uuid::new_v4()))
            .join("services.json");
        let store = into_dyn(ServiceCatalog::open(&path).await?);

        let rec = store.create(NewService::new("Home Assistant", "http://ha.lan:8123")).await?;
        assert_eq!(store.get(&rec.id).await?.map(|r| r.name), Some("Home Assistant".to_string()));
        let upd = store.update(&rec.id, ServicePatch::default().category("Automation")).await?;
        assert_eq!(upd.category, "Automation");
        assert_eq!(store.list().await?.len(), 1);
        assert!(store.delete(&rec.id).await?);
        assert!(store.get(&rec.id).await?.is_none());

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}

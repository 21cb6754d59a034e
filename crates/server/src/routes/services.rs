use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use common::types::Outcome;
use service::catalog::{NewService, ServicePatch, ServiceRecord};
use service::errors::ServiceError;
use tracing::{error, info};

use crate::{errors::JsonApiError, observability, routes::ServerState};

fn failed(op: &'static str, e: ServiceError) -> JsonApiError {
    observability::record_op(op, false);
    if !e.is_client_error() {
        error!(op, err = %e, "catalog operation failed");
    }
    e.into()
}

#[utoipa::path(
    get, path = "/services", tag = "services",
    responses(
        (status = 200, description = "All services in stored order", body = [crate::openapi::ServiceRecordDoc]),
        (status = 500, description = "Store unreadable", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list_services(State(state): State<ServerState>) -> Result<Json<Vec<ServiceRecord>>, JsonApiError> {
    let list = state.catalog.list().await.map_err(|e| failed("list", e))?;
    observability::record_op("list", true);
    observability::SERVICES_STORED.set(list.len() as i64);
    info!(count = list.len(), "list services");
    Ok(Json(list))
}

#[utoipa::path(
    post, path = "/services", tag = "services",
    request_body = crate::openapi::NewServiceDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ServiceRecordDoc),
        (status = 400, description = "Name or URL missing", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Supplied id already in use", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Create Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create_service(
    State(state): State<ServerState>,
    payload: Result<Json<NewService>, JsonRejection>,
) -> Result<(StatusCode, Json<ServiceRecord>), JsonApiError> {
    let Json(input) = payload?;
    let created = state.catalog.create(input).await.map_err(|e| failed("create", e))?;
    observability::record_op("create", true);
    info!(id = %created.id, name = %created.name, "created service");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ServiceRecordDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get_service(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceRecord>, JsonApiError> {
    match state.catalog.get(&id).await.map_err(|e| failed("get", e))? {
        Some(rec) => {
            observability::record_op("get", true);
            Ok(Json(rec))
        }
        None => {
            observability::record_op("get", false);
            Err(JsonApiError::not_found("service not found"))
        }
    }
}

#[utoipa::path(
    put, path = "/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service ID")),
    request_body = crate::openapi::ServicePatchDoc,
    responses(
        (status = 200, description = "Merged record", body = crate::openapi::ServiceRecordDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 422, description = "Unknown field in body", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Update Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update_service(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<ServicePatch>, JsonRejection>,
) -> Result<Json<ServiceRecord>, JsonApiError> {
    let Json(patch) = payload?;
    let merged = state.catalog.update(&id, patch).await.map_err(|e| failed("update", e))?;
    observability::record_op("update", true);
    info!(id = %merged.id, "updated service");
    Ok(Json(merged))
}

#[utoipa::path(
    delete, path = "/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::OutcomeDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Delete Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete_service(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Outcome>, JsonApiError> {
    if state.catalog.delete(&id).await.map_err(|e| failed("delete", e))? {
        observability::record_op("delete", true);
        info!(id = %id, "deleted service");
        Ok(Json(Outcome { success: true }))
    } else {
        observability::record_op("delete", false);
        Err(JsonApiError::not_found("service not found"))
    }
}

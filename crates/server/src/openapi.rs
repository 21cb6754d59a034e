use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ServiceRecordDoc {
    pub id: String,
    pub name: String,
    pub url: String,
    pub description: String,
    /// Defaults to `Uncategorized`.
    pub category: String,
}

#[derive(ToSchema)]
pub struct NewServiceDoc {
    /// Optional; generated when absent, rejected with 409 when already used.
    pub id: Option<String>,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(ToSchema)]
pub struct ServicePatchDoc {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(ToSchema)]
pub struct OutcomeDoc { pub success: bool }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String, pub detail: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::services::list_services,
        crate::routes::services::create_service,
        crate::routes::services::get_service,
        crate::routes::services::update_service,
        crate::routes::services::delete_service,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceRecordDoc,
            NewServiceDoc,
            ServicePatchDoc,
            OutcomeDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "services")
    )
)]
pub struct ApiDoc;

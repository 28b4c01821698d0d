use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Vebuser API",
        version = "0.1.0",
        description = "API for managing users and their roles"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/user", api = domain_users::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

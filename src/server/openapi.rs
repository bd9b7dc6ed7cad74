//! OpenAPI documentation and Swagger UI integration.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::AppContext;

/// OpenAPI documentation for the ledger API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Liji API",
        version = "0.1.0",
        description = "Gift ledger: records, giftbooks and a shared password",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Default server")
    ),
    paths(
        super::health_check,
        super::routes_password::password_status,
        super::routes_password::set_password,
        super::routes_password::verify_password,
        super::routes_ledger::list_records,
        super::routes_ledger::save_records,
        super::routes_ledger::list_giftbooks,
        super::routes_ledger::save_giftbooks,
    ),
    components(
        schemas(
            super::HealthResponse,
            super::routes_password::PasswordStatusResponse,
            super::routes_password::SetPasswordRequest,
            super::routes_password::VerifyPasswordRequest,
            super::routes_password::PasswordResponse,
            super::routes_ledger::SaveResponse,
            liji_db::models::Record,
            liji_db::models::RecordInput,
            liji_db::models::Giftbook,
            liji_db::models::GiftbookInput,
            liji_db::models::GiftbookItem,
            liji_db::models::GiftbookItemInput,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "password", description = "Shared password gate"),
        (name = "records", description = "Gift records"),
        (name = "giftbooks", description = "Giftbooks and their items"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/docs` and the document at `/openapi.json`, relative to
/// where the router is nested.
pub fn openapi_routes() -> Router<AppContext> {
    Router::new().merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_ledger_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/password",
            "/api/password/status",
            "/api/password/verify",
            "/api/records",
            "/api/giftbooks",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Registry API",
        version = "0.1.0",
        description = "Registration form with profile image upload and a cookie-gated dashboard.\n\n**Access:** registering sets the `registered` cookie. Every `/dashboard` route requires it; requests without it are redirected to `/`. The cookie carries no identity, so any holder can manage every user."
    ),
    paths(
        crate::api::register::register,
        crate::api::register::logout,
        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::api::register::ProfileFormBody,
            crate::api::users::UserListResponse,
            crate::api::health::HealthResponse,
            crate::models::UserView,
            crate::utils::error::ErrorResponse,
            crate::utils::error::FieldError,
        )
    ),
    tags(
        (name = "Registration", description = "Public registration form and logout."),
        (name = "Dashboard", description = "User management. Requires the registration marker cookie."),
        (name = "Health", description = "Service status."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "registered_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::middleware::session::COOKIE_NAME,
                ))),
            );
        }
    }
}

use actix_web::{http::header, web, HttpRequest, HttpResponse, ResponseError};
use crate::{
    api::form::read_profile_form,
    models::UserView,
    services::user_service,
    state::AppState,
};

/// Multipart body accepted by the registration and edit endpoints.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct ProfileFormBody {
    pub full_name: String,
    pub email: String,
    /// Exactly 10 digits; spaces and dashes are ignored.
    pub phone: String,
    /// JPEG, PNG or WebP, at most 5 MB. Optional when editing.
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Registration",
    request_body(content = ProfileFormBody, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User registered, marker cookie issued", body = UserView),
        (status = 400, description = "Invalid form fields", body = crate::utils::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::utils::error::ErrorResponse),
        (status = 502, description = "Image host unavailable", body = crate::utils::error::ErrorResponse)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: Result<web::Bytes, actix_web::Error>,
) -> HttpResponse {
    log::info!("📝 POST /api/register");

    let form = match read_profile_form(&req, body).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("❌ Registration form unreadable: {}", e);
            return e.error_response();
        }
    };
    let email = form.email.clone().unwrap_or_default();

    match user_service::register(
        state.users.as_ref(),
        state.images.as_ref(),
        &state.image_folder,
        form,
    )
    .await
    {
        Ok(user) => {
            log::info!("✅ Registration successful: {}", user.email);
            HttpResponse::Created()
                .cookie(state.gate.issue())
                .json(serde_json::json!({
                    "success": true,
                    "user": UserView::from(user),
                    "redirect": "/dashboard"
                }))
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", email, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Registration",
    responses(
        (status = 302, description = "Marker cookie revoked, redirected to the registration form")
    )
)]
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    log::info!("👋 POST /logout");

    HttpResponse::Found()
        .cookie(state.gate.revoke())
        .insert_header((header::LOCATION, "/"))
        .finish()
}

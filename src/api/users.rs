use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use crate::{
    api::form::read_profile_form,
    models::UserView,
    services::user_service,
    state::AppState,
};
use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserView>,
    pub count: usize,
}

/// GET /dashboard - every registered user, newest first
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Registered users, newest first", body = UserListResponse),
        (status = 302, description = "No registration marker, redirected to /")
    ),
    security(("registered_cookie" = []))
)]
pub async fn list_users(state: web::Data<AppState>) -> HttpResponse {
    log::info!("📋 GET /dashboard");

    match user_service::list(state.users.as_ref()).await {
        Ok(users) => {
            log::info!("✅ Listed {} users", users.len());
            let users: Vec<UserView> = users.into_iter().map(UserView::from).collect();
            HttpResponse::Ok().json(UserListResponse {
                success: true,
                count: users.len(),
                users,
            })
        }
        Err(e) => {
            log::error!("❌ Error listing users: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/dashboard/users/{id}",
    tag = "Dashboard",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserView),
        (status = 404, description = "Unknown user", body = crate::utils::error::ErrorResponse)
    ),
    security(("registered_cookie" = []))
)]
pub async fn get_user(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    log::info!("👤 GET /dashboard/users/{}", id);

    match user_service::get(state.users.as_ref(), &id).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": UserView::from(user)
        })),
        Err(e) => {
            log::warn!("⚠️ User {} unavailable: {}", id, e);
            e.error_response()
        }
    }
}

/// PUT /dashboard/users/{id} - multipart edit; the image part is optional
#[utoipa::path(
    put,
    path = "/dashboard/users/{id}",
    tag = "Dashboard",
    params(("id" = String, Path, description = "User id")),
    request_body(content = crate::api::register::ProfileFormBody, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "User updated", body = UserView),
        (status = 400, description = "Invalid form fields", body = crate::utils::error::ErrorResponse),
        (status = 404, description = "Unknown user", body = crate::utils::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::utils::error::ErrorResponse)
    ),
    security(("registered_cookie" = []))
)]
pub async fn update_user(
    state: web::Data<AppState>,
    id: web::Path<String>,
    req: HttpRequest,
    body: Result<web::Bytes, actix_web::Error>,
) -> HttpResponse {
    log::info!("🔧 PUT /dashboard/users/{}", id);

    let form = match read_profile_form(&req, body).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("❌ Edit form unreadable: {}", e);
            return e.error_response();
        }
    };

    match user_service::update(
        state.users.as_ref(),
        state.images.as_ref(),
        &state.image_folder,
        &id,
        form,
    )
    .await
    {
        Ok(user) => {
            log::info!("✅ User {} updated", id);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "user": UserView::from(user)
            }))
        }
        Err(e) => {
            log::warn!("⚠️ Failed to update {}: {}", id, e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/dashboard/users/{id}",
    tag = "Dashboard",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User and hosted image removed"),
        (status = 404, description = "Unknown user", body = crate::utils::error::ErrorResponse)
    ),
    security(("registered_cookie" = []))
)]
pub async fn delete_user(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    log::info!("🗑️  DELETE /dashboard/users/{}", id);

    match user_service::delete(state.users.as_ref(), state.images.as_ref(), &id).await {
        Ok(()) => {
            log::info!("✅ User {} deleted", id);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "message": "User deleted successfully"
            }))
        }
        Err(e) => {
            log::warn!("⚠️ Failed to delete {}: {}", id, e);
            e.error_response()
        }
    }
}

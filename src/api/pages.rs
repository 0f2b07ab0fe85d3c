use actix_web::HttpResponse;

const REGISTER_PAGE: &str = include_str!("../../static/register.html");

/// GET / - registration entry point; the dashboard gate redirects here.
pub async fn register_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(REGISTER_PAGE)
}

pub mod form;
pub mod health;
pub mod pages;
pub mod register;
pub mod swagger;
pub mod users;

use actix_web::web;

/// Every route of the service. The dashboard gate is applied by the caller
/// around the whole app. Bodies over the payload limit reach the form
/// handlers as an error and are answered as an `image` validation failure.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(form::MAX_FORM_BYTES))
        .route("/", web::get().to(pages::register_page))
        .route("/health", web::get().to(health::health_check))
        .route("/api/register", web::post().to(register::register))
        .route("/logout", web::post().to(register::logout))
        .service(
            web::scope("/dashboard")
                .route("", web::get().to(users::list_users))
                .route("/users/{id}", web::get().to(users::get_user))
                .route("/users/{id}", web::put().to(users::update_user))
                .route("/users/{id}", web::delete().to(users::delete_user)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        middleware::{session::COOKIE_NAME, RequireRegistration, SessionGate},
        repository::{memory::InMemoryUserRepository, UserRepository},
        services::image_host::fake::RecordingImageHost,
        state::AppState,
    };
    use actix_web::{
        cookie::Cookie,
        http::{header, StatusCode},
        test, App,
    };
    use std::sync::Arc;

    struct Harness {
        users: Arc<InMemoryUserRepository>,
        images: Arc<RecordingImageHost>,
        state: web::Data<AppState>,
    }

    fn harness() -> Harness {
        let users = Arc::new(InMemoryUserRepository::new());
        let images = Arc::new(RecordingImageHost::default());
        let state = web::Data::new(AppState::new(
            users.clone(),
            images.clone(),
            SessionGate::new(false),
            "users",
        ));
        Harness { users, images, state }
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .wrap(RequireRegistration::new("/dashboard", "/"))
                    .configure(configure),
            )
            .await
        };
    }

    fn registration(name: &str, email: &str) -> test::TestRequest {
        let body = form::testing::body(
            &[("full_name", name), ("email", email), ("phone", "0123456789")],
            Some(("me.jpg", "image/jpeg", &b"\xff\xd8\xff"[..])),
        );
        test::TestRequest::post()
            .uri("/api/register")
            .insert_header((header::CONTENT_TYPE, form::testing::content_type()))
            .set_payload(body)
    }

    fn marker() -> Cookie<'static> {
        Cookie::new(COOKIE_NAME, "true")
    }

    #[actix_web::test]
    async fn test_register_issues_marker_and_lists_newest_first() {
        let h = harness();
        let app = app!(h.state);

        let res = test::call_service(&app, registration("Alan Turing", "alan@example.com").to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == COOKIE_NAME)
            .expect("marker cookie issued")
            .into_owned();
        assert_eq!(cookie.value(), "true");

        let res = test::call_service(&app, registration("Grace Hopper", "grace@example.com").to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/dashboard").cookie(cookie).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["count"], 2);
        assert_eq!(body["users"][0]["email"], "grace@example.com");
        assert_eq!(body["users"][1]["email"], "alan@example.com");
    }

    #[actix_web::test]
    async fn test_dashboard_redirects_without_marker() {
        let h = harness();
        let app = app!(h.state);

        let res = test::call_service(&app, test::TestRequest::get().uri("/dashboard").to_request()).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn test_encoded_dashboard_paths_redirect_without_marker() {
        let h = harness();
        let app = app!(h.state);
        test::call_service(&app, registration("Alan Turing", "alan@example.com").to_request()).await;
        let id = h.users.find_all().await.unwrap()[0].id.unwrap().to_hex();

        for uri in [
            "/%64ashboard".to_string(),
            "/dashboard/".to_string(),
            format!("/%64ashboard/users/{}", id),
            format!("/dashboard/users/%{:02x}{}", id.as_bytes()[0], &id[1..]),
        ] {
            let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
            assert_eq!(res.status(), StatusCode::FOUND, "{}", uri);
            assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");
            let body = test::read_body(res).await;
            assert!(!std::str::from_utf8(&body).unwrap().contains("alan@example.com"));
        }

        let req = test::TestRequest::get().uri("/%64ashboard").cookie(marker()).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);
    }

    #[actix_web::test]
    async fn test_oversized_upload_is_a_json_validation_error() {
        let h = harness();
        let app = app!(h.state);

        let req = test::TestRequest::post()
            .uri("/api/register")
            .insert_header((header::CONTENT_TYPE, form::testing::content_type()))
            .set_payload(vec![b'x'; form::MAX_FORM_BYTES + 1])
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["fields"][0]["field"], "image");
        assert_eq!(h.images.upload_count(), 0);
        assert_eq!(h.users.len(), 0);
    }

    #[actix_web::test]
    async fn test_duplicate_email_conflicts() {
        let h = harness();
        let app = app!(h.state);

        test::call_service(&app, registration("Alan Turing", "alan@example.com").to_request()).await;
        let res = test::call_service(&app, registration("Someone Else", "ALAN@EXAMPLE.COM").to_request()).await;

        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert!(res.response().cookies().next().is_none());
        assert_eq!(h.users.len(), 1);
        assert_eq!(h.images.upload_count(), 1);
    }

    #[actix_web::test]
    async fn test_invalid_registration_reports_fields() {
        let h = harness();
        let app = app!(h.state);

        let req = registration("A", "nope").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        let fields: Vec<&str> = body["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["full_name", "email"]);
        assert_eq!(h.images.upload_count(), 0);
    }

    #[actix_web::test]
    async fn test_edit_and_delete_flow() {
        let h = harness();
        let app = app!(h.state);

        let res = test::call_service(&app, registration("Alan Turing", "alan@example.com").to_request()).await;
        let created: serde_json::Value = test::read_body_json(res).await;
        let id = created["user"]["id"].as_str().unwrap().to_string();

        let edit = form::testing::body(
            &[("full_name", "Alan M. Turing"), ("email", "alan@example.com"), ("phone", "9876543210")],
            None,
        );
        let req = test::TestRequest::put()
            .uri(&format!("/dashboard/users/{}", id))
            .cookie(marker())
            .insert_header((header::CONTENT_TYPE, form::testing::content_type()))
            .set_payload(edit)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["user"]["full_name"], "Alan M. Turing");
        assert_eq!(body["user"]["phone"], "9876543210");

        let req = test::TestRequest::delete()
            .uri(&format!("/dashboard/users/{}", id))
            .cookie(marker())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(h.images.deleted(), vec!["users/img-1".to_string()]);

        let req = test::TestRequest::get().uri("/dashboard").cookie(marker()).to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 0);

        let req = test::TestRequest::get()
            .uri(&format!("/dashboard/users/{}", id))
            .cookie(marker())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_logout_revokes_marker() {
        let h = harness();
        let app = app!(h.state);

        let req = test::TestRequest::post().uri("/logout").cookie(marker()).to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FOUND);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == COOKIE_NAME)
            .expect("removal cookie")
            .into_owned();
        assert_eq!(cookie.value(), "");

        let req = test::TestRequest::get().uri("/dashboard").cookie(cookie).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND);
    }

    #[actix_web::test]
    async fn test_registration_page_and_health_are_public() {
        let h = harness();
        let app = app!(h.state);

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let html = test::read_body(res).await;
        assert!(std::str::from_utf8(&html).unwrap().contains("/api/register"));

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "unconfigured");
    }
}

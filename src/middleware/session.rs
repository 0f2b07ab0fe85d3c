//! Cookie-based gate for the dashboard.
//!
//! The `registered` cookie is the whole session: present means the browser
//! completed a registration at some point, absent means it did not. The marker
//! carries no identity, so any holder may manage every user record.

use actix_web::{
    body::EitherBody,
    cookie::{time::Duration, time::OffsetDateTime, Cookie, SameSite},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpRequest, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

pub const COOKIE_NAME: &str = "registered";
pub const MARKER_LIFETIME_DAYS: i64 = 7;

/// Issues, checks and revokes the registration marker.
#[derive(Debug, Clone, Copy)]
pub struct SessionGate {
    secure: bool,
}

impl SessionGate {
    /// `secure` restricts the cookie to HTTPS; enabled in production.
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn issue(&self) -> Cookie<'static> {
        Cookie::build(COOKIE_NAME, "true")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::days(MARKER_LIFETIME_DAYS))
            .finish()
    }

    pub fn revoke(&self) -> Cookie<'static> {
        Cookie::build(COOKIE_NAME, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .finish()
    }

    /// Any non-empty marker value counts as registered.
    pub fn check(req: &HttpRequest) -> bool {
        req.cookie(COOKIE_NAME)
            .map(|c| !c.value().is_empty())
            .unwrap_or(false)
    }
}

/// Redirects requests under `prefix` that carry no marker to `redirect_to`.
pub struct RequireRegistration {
    prefix: Rc<str>,
    redirect_to: Rc<str>,
}

impl RequireRegistration {
    pub fn new(prefix: &str, redirect_to: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').into(),
            redirect_to: redirect_to.into(),
        }
    }
}

/// `/dashboard` guards `/dashboard` and `/dashboard/...`, not `/dashboardx`.
/// `path` must be the requoted path the router matches on, not the raw URI.
fn is_protected(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRegistration
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRegistrationService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRegistrationService {
            service,
            prefix: Rc::clone(&self.prefix),
            redirect_to: Rc::clone(&self.redirect_to),
        }))
    }
}

pub struct RequireRegistrationService<S> {
    service: S,
    prefix: Rc<str>,
    redirect_to: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for RequireRegistrationService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Routing decodes percent-escapes (`/%64ashboard`), so gate on the same path.
        let routed = req.match_info().as_str();
        if !is_protected(&self.prefix, routed) || SessionGate::check(req.request()) {
            let fut = self.service.call(req);
            return Box::pin(async move {
                let res = fut.await?;
                Ok(res.map_into_left_body())
            });
        }

        log::info!("🚧 {} {} without marker, redirecting", req.method(), routed);

        let response = HttpResponse::Found()
            .insert_header((header::LOCATION, self.redirect_to.as_ref()))
            .finish()
            .map_into_right_body();
        let (http_req, _payload) = req.into_parts();

        Box::pin(async move { Ok(ServiceResponse::new(http_req, response)) })
    }
}

//! `multipart/form-data` decoding for the profile forms.

use crate::{
    services::{image_host::ImageUpload, validation::ProfileForm},
    utils::error::{AppError, FieldError},
};
use actix_web::{error::PayloadError, http::header, web, HttpRequest};
use futures::{future::ready, stream::once};
use std::convert::Infallible;

/// Upper bound for a buffered form body: one image plus text fields.
pub const MAX_FORM_BYTES: usize = 6 * 1024 * 1024;

fn bad_form(message: impl Into<String>) -> AppError {
    AppError::Validation(vec![FieldError::new("form", message)])
}

/// A body over [`MAX_FORM_BYTES`] can only be an oversized image.
fn unreadable_body(err: actix_web::Error) -> AppError {
    match err.as_error::<PayloadError>() {
        Some(PayloadError::Overflow) => AppError::Validation(vec![FieldError::new(
            "image",
            "Upload is too large, images must be at most 5 MB",
        )]),
        _ => bad_form(format!("Unreadable request body: {}", err)),
    }
}

/// Decodes the buffered body into a [`ProfileForm`]. Unknown fields are
/// ignored; an empty file part (no file chosen) counts as no image.
pub async fn read_profile_form(
    req: &HttpRequest,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<ProfileForm, AppError> {
    let body = body.map_err(unreadable_body)?;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| bad_form("Expected a multipart/form-data body"))?;

    let stream = once(ready(Ok::<web::Bytes, Infallible>(body)));
    let mut multipart = multer::Multipart::new(stream, boundary);
    let mut form = ProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_form(format!("Malformed form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "full_name" | "email" | "phone" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad_form(format!("Unreadable field {}: {}", name, e)))?;
                match name.as_str() {
                    "full_name" => form.full_name = Some(value),
                    "email" => form.email = Some(value),
                    _ => form.phone = Some(value),
                }
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_form(format!("Unreadable image: {}", e)))?;

                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        bytes: bytes.to_vec(),
                        file_name,
                        content_type,
                    });
                }
            }
            other => log::debug!("Ignoring form field {}", other),
        }
    }

    Ok(form)
}

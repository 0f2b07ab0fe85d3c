use crate::{
    services::image_host::ImageUpload,
    utils::error::{AppError, FieldError},
};
use lazy_static::lazy_static;
use regex::Regex;

pub const PHONE_DIGITS: usize = 10;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email pattern is valid");
}

/// Raw form input as submitted; any field may be missing.
#[derive(Debug, Default, Clone)]
pub struct ProfileForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Normalised, validated profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Validates a form. `image_required` is true for registration, false for edits.
pub fn validate(form: &ProfileForm, image_required: bool) -> Result<Profile, AppError> {
    let mut errors = Vec::new();

    let full_name = form.full_name.as_deref().unwrap_or("").trim().to_string();
    let name_len = full_name.chars().count();
    if name_len == 0 {
        errors.push(FieldError::new("full_name", "Full name is required"));
    } else if name_len < 2 {
        errors.push(FieldError::new("full_name", "Full name must be at least 2 characters"));
    } else if name_len > 100 {
        errors.push(FieldError::new("full_name", "Full name must be at most 100 characters"));
    }

    let email = normalize_email(form.email.as_deref().unwrap_or(""));
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !EMAIL_RE.is_match(&email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }

    let phone: String = form
        .phone
        .as_deref()
        .unwrap_or("")
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if phone.is_empty() {
        errors.push(FieldError::new("phone", "Phone number is required"));
    } else if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "phone",
            format!("Phone number must be exactly {} digits", PHONE_DIGITS),
        ));
    }

    match &form.image {
        Some(image) => {
            if let Some(message) = check_image(image) {
                errors.push(FieldError::new("image", message));
            }
        }
        None if image_required => errors.push(FieldError::new("image", "Profile image is required")),
        None => {}
    }

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(Profile {
        full_name,
        email,
        phone,
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_image(image: &ImageUpload) -> Option<String> {
    if image.bytes.is_empty() {
        return Some("Profile image is empty".to_string());
    }
    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Some("Image must be a JPEG, PNG or WebP file".to_string());
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Some("Image must be 5 MB or smaller".to_string());
    }
    None
}

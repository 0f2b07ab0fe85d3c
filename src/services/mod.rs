pub mod image_host;
pub mod user_service;
pub mod validation;

use crate::{middleware::SessionGate, repository::UserRepository, services::image_host::ImageHost};
use std::sync::Arc;

/// Shared by every worker through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub images: Arc<dyn ImageHost>,
    pub gate: SessionGate,
    pub image_folder: String,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageHost>,
        gate: SessionGate,
        image_folder: impl Into<String>,
    ) -> Self {
        Self {
            users,
            images,
            gate,
            image_folder: image_folder.into(),
        }
    }
}

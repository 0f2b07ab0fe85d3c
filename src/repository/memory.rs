//! In-memory store used by the test suite.

use super::{parse_id, UserRepository};
use crate::{
    models::{NewUser, User, UserChanges},
    utils::error::AppError,
};
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    // Strictly increasing clock so "newest first" is deterministic.
    clock: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn tick(&self) -> DateTime {
        DateTime::from_millis(1_700_000_000_000 + self.clock.fetch_add(1_000, Ordering::SeqCst))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let now = self.tick();
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let record = User {
            id: Some(ObjectId::new()),
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            image_url: user.image_url,
            image_public_id: user.image_public_id,
            created_at: now,
            updated_at: now,
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == Some(oid)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: &str, changes: UserChanges) -> Result<User, AppError> {
        let oid = parse_id(id)?;
        let now = self.tick();
        let mut users = self.users.lock().unwrap();

        if users
            .iter()
            .any(|u| u.email == changes.email && u.id != Some(oid))
        {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let user = users
            .iter_mut()
            .find(|u| u.id == Some(oid))
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", id)))?;

        user.full_name = changes.full_name;
        user.email = changes.email;
        user.phone = changes.phone;
        if let Some((url, public_id)) = changes.image {
            user.image_url = url;
            user.image_public_id = public_id;
        }
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let oid = parse_id(id)?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != Some(oid));
        Ok(users.len() < before)
    }
}

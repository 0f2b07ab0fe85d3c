// ==================== USER RECORD STORE ====================
// Persistence port for user profiles plus its MongoDB adapter.
// The adapter pulls its handle from the shared connection cache on every call.

#[cfg(test)]
pub mod memory;

use crate::{
    database::{MongoCache, MongoDB, USERS_COLLECTION},
    models::{NewUser, User, UserChanges},
    utils::error::AppError,
};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    options::ReturnDocument,
    Collection,
};
use std::sync::Arc;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a record; `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    /// All records, newest first.
    async fn find_all(&self) -> Result<Vec<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Applies `changes` and bumps `updated_at`; `NotFound` when absent.
    async fn update(&self, id: &str, changes: UserChanges) -> Result<User, AppError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

/// Unparseable ids can never match a stored record.
pub fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::NotFound(format!("User '{}' not found", id)))
}

pub struct MongoUserRepository {
    cache: Arc<MongoCache>,
}

impl MongoUserRepository {
    pub fn new(cache: Arc<MongoCache>) -> Self {
        Self { cache }
    }

    async fn users(&self) -> Result<Collection<User>, AppError> {
        let db: MongoDB = self.cache.get().await?;
        Ok(db.collection::<User>(USERS_COLLECTION))
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let users = self.users().await?;
        let now = DateTime::now();

        let mut record = User {
            id: None,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            image_url: user.image_url,
            image_public_id: user.image_public_id,
            created_at: now,
            updated_at: now,
        };

        let inserted = users.insert_one(&record).await?;
        record.id = inserted.inserted_id.as_object_id();

        log::info!("💾 User record created: {}", record.email);
        Ok(record)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let users = self.users().await?;

        let cursor = users
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;

        let records: Vec<User> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };
        let users = self.users().await?;

        Ok(users.find_one(doc! { "_id": oid }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users().await?;

        Ok(users.find_one(doc! { "email": email }).await?)
    }

    async fn update(&self, id: &str, changes: UserChanges) -> Result<User, AppError> {
        let oid = parse_id(id)?;
        let users = self.users().await?;

        let mut set = doc! {
            "full_name": changes.full_name,
            "email": changes.email,
            "phone": changes.phone,
            "updated_at": DateTime::now(),
        };
        if let Some((url, public_id)) = changes.image {
            set.insert("image_url", url);
            set.insert("image_public_id", public_id);
        }

        users
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", id)))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let oid = parse_id(id)?;
        let users = self.users().await?;

        let result = users.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }
}

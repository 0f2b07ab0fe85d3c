use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Document in the "users" collection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String, // always lowercased
    pub phone: String,
    pub image_url: String,
    pub image_public_id: String, // image host deletion handle
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Fields for a record that does not exist yet. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub image_url: String,
    pub image_public_id: String,
}

/// Replacement values for an edit. `None` keeps the stored image.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub image: Option<(String, String)>, // (url, public_id)
}

/// Public JSON view of a user record.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct UserView {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub image_url: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            image_url: user.image_url,
            created_at: user.created_at.try_to_rfc3339_string().unwrap_or_default(),
            updated_at: user.updated_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

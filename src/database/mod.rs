pub mod cache;

pub use cache::{ConnectionCache, Connector};

use crate::utils::error::AppError;
use async_trait::async_trait;
use mongodb::{Client, Collection, Database};
use std::time::Duration;

pub const USERS_COLLECTION: &str = "users";

/// Live link to the document store. Cheap to clone.
#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri)
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        client_options.app_name = Some("user-registry".to_string());

        let client =
            Client::with_options(client_options).map_err(|e| AppError::Connection(e.to_string()))?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names()
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the unique email index the registration flow relies on.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Ensuring database indexes...");

        let users = self.collection::<mongodb::bson::Document>(USERS_COLLECTION);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        users
            .create_index(email_index)
            .await
            .map_err(|e| AppError::DatabaseError(format!("unique email index: {}", e)))?;
        log::info!("   ✅ Index ready: users(email) unique");

        let created_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .build();

        match users.create_index(created_index).await {
            Ok(_) => log::info!("   ✅ Index ready: users(created_at)"),
            Err(e) => log::debug!("   ℹ️  Index users(created_at) not created: {}", e),
        }

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Opens a [`MongoDB`] handle from a connection string.
pub struct MongoConnector {
    uri: String,
    db_name: String,
}

impl MongoConnector {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
        }
    }
}

#[async_trait]
impl Connector for MongoConnector {
    type Handle = MongoDB;

    async fn connect(&self) -> Result<MongoDB, AppError> {
        log::info!("🔌 Connecting to MongoDB database: {}", self.db_name);
        MongoDB::connect(&self.uri, &self.db_name).await
    }
}

pub type MongoCache = ConnectionCache<MongoConnector>;

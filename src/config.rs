use crate::utils::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub cloudinary: CloudinaryConfig,
    pub production: bool,
    pub cors_origin: String,
}

impl Config {
    /// Reads the process environment. Call `dotenv()` first to honour `.env`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::Configuration(format!("{} must be set", key)))
        };

        let mongodb_uri = required("MONGODB_URI")?;
        let mongodb_database = lookup("MONGODB_DATABASE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| database_name_from_uri(&mongodb_uri));

        let port = match lookup("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| AppError::Configuration(format!("PORT is not a valid port: {}", p)))?,
            None => 3000,
        };

        let cloudinary = CloudinaryConfig {
            cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            api_key: required("CLOUDINARY_API_KEY")?,
            api_secret: required("CLOUDINARY_API_SECRET")?,
            folder: lookup("CLOUDINARY_FOLDER").unwrap_or_else(|| "user-registry".to_string()),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            mongodb_uri,
            mongodb_database,
            cloudinary,
            production: lookup("APP_ENV").as_deref() == Some("production"),
            cors_origin: lookup("CORS_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
        })
    }
}

/// Extract database name from the URI path, falling back to a default.
fn database_name_from_uri(uri: &str) -> String {
    uri.splitn(2, "://")
        .nth(1)
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, path)| path.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or("user_registry")
        .to_string()
}

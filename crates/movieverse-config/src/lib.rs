pub mod api_key;
pub mod config;
pub mod credentials;
pub mod paths;

pub use api_key::{resolve_api_key, ApiKey, ApiKeyError, ApiKeySource, API_KEY_ENV, FALLBACK_API_KEY_ENV, PLACEHOLDER_API_KEY};
pub use config::{CacheConfig, CatalogConfig, Config, LoggingConfig, RetryConfig, DEFAULT_IMAGE_BASE_URL, DEFAULT_TMDB_BASE_URL};
pub use credentials::CredentialStore;
pub use paths::{home_override, PathManager};

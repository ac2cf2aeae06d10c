use std::fmt;

use crate::credentials::CredentialStore;

pub const API_KEY_ENV: &str = "MOVIEVERSE_TMDB_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "TMDB_API_KEY";
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

const SETUP_HINT: &str = "Set MOVIEVERSE_TMDB_API_KEY in your environment or in a .env file, \
or run `movieverse config set-key <KEY>`. Keys are issued at https://www.themoviedb.org/settings/api";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiKeyError {
    #[error("TMDB API key is missing. {}", SETUP_HINT)]
    Missing,

    #[error("TMDB API key is still the placeholder '{}'. {}", PLACEHOLDER_API_KEY, SETUP_HINT)]
    Placeholder,
}

/// The pre-shared catalog key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Result<Self, ApiKeyError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ApiKeyError::Missing);
        }
        if trimmed == PLACEHOLDER_API_KEY {
            return Err(ApiKeyError::Placeholder);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First four characters followed by asterisks.
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(4).collect();
        format!("{}{}", visible, "*".repeat(self.0.chars().count().saturating_sub(4).max(4)))
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment(&'static str),
    CredentialsFile,
}

impl fmt::Display for ApiKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeySource::Environment(var) => write!(f, "environment variable {}", var),
            ApiKeySource::CredentialsFile => write!(f, "credentials file"),
        }
    }
}

/// Find the API key before any request is made.
///
/// Loads a `.env` file from the working directory if one exists, then checks
/// `MOVIEVERSE_TMDB_API_KEY`, `TMDB_API_KEY` and finally the credentials file.
pub fn resolve_api_key(credentials: Option<&CredentialStore>) -> Result<(ApiKey, ApiKeySource), ApiKeyError> {
    dotenvy::dotenv().ok();
    resolve_with(|name| std::env::var(name).ok(), credentials.and_then(|c| c.get_tmdb_api_key().cloned()))
}

fn resolve_with(
    lookup: impl Fn(&str) -> Option<String>,
    stored: Option<String>,
) -> Result<(ApiKey, ApiKeySource), ApiKeyError> {
    let candidates = [
        (lookup(API_KEY_ENV), ApiKeySource::Environment(API_KEY_ENV)),
        (lookup(FALLBACK_API_KEY_ENV), ApiKeySource::Environment(FALLBACK_API_KEY_ENV)),
        (stored, ApiKeySource::CredentialsFile),
    ];

    let mut saw_placeholder = false;
    for (value, source) in candidates {
        let Some(value) = value else { continue };
        match ApiKey::new(value) {
            Ok(key) => return Ok((key, source)),
            Err(ApiKeyError::Placeholder) => saw_placeholder = true,
            Err(ApiKeyError::Missing) => {}
        }
    }

    if saw_placeholder {
        Err(ApiKeyError::Placeholder)
    } else {
        Err(ApiKeyError::Missing)
    }
}

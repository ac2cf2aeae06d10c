use movieverse_catalog::CatalogError;
use std::sync::Arc;

/// A failed query, shared by every caller that was waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
#[error(transparent)]
pub struct QueryError(Arc<CatalogError>);

impl QueryError {
    pub fn catalog_error(&self) -> &CatalogError {
        &self.0
    }

    pub fn is_authentication(&self) -> bool {
        self.0.is_authentication()
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(*self.0, CatalogError::NotConfigured(_))
    }

    /// Short message for end users. Configuration and key problems explain
    /// themselves; anything else is a generic load failure.
    pub fn user_message(&self) -> String {
        match &*self.0 {
            CatalogError::NotConfigured(e) => e.to_string(),
            CatalogError::Authentication { .. } => {
                "Invalid or missing API key. Please check your TMDB API key configuration.".to_string()
            }
            _ => "Failed to load movies. Please try again.".to_string(),
        }
    }
}

impl From<CatalogError> for QueryError {
    fn from(err: CatalogError) -> Self {
        Self(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movieverse_catalog::TransportError;
    use movieverse_config::ApiKeyError;

    fn status(code: u16) -> QueryError {
        QueryError::from(CatalogError::from(TransportError::Status {
            status: code,
            url: "https://api.example/3/movie/popular".to_string(),
            message: String::new(),
        }))
    }

    #[test]
    fn test_user_messages() {
        assert!(status(401).user_message().contains("API key"));
        assert!(status(401).is_authentication());
        assert_eq!(status(502).user_message(), "Failed to load movies. Please try again.");

        let missing = QueryError::from(CatalogError::from(ApiKeyError::Missing));
        assert!(missing.is_not_configured());
        assert!(missing.user_message().contains("MOVIEVERSE_TMDB_API_KEY"));
    }

    #[test]
    fn test_clones_share_the_error() {
        let err = status(500);
        let copy = err.clone();
        assert!(std::ptr::eq(err.catalog_error(), copy.catalog_error()));
        assert_eq!(err.to_string(), copy.to_string());
    }
}

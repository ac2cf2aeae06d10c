use movieverse_config::ApiKeyError;

use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    NotConfigured(#[from] ApiKeyError),

    /// The catalog rejected the key (HTTP 401).
    #[error(
        "TMDB rejected the request: the API key is missing or invalid. \
         Check MOVIEVERSE_TMDB_API_KEY or run `movieverse config set-key <KEY>`"
    )]
    Authentication {
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Transport(TransportError),

    #[error("failed to set up the HTTP client: {0}")]
    Setup(String),
}

impl From<TransportError> for CatalogError {
    fn from(err: TransportError) -> Self {
        if err.is_unauthorized() {
            CatalogError::Authentication { source: err }
        } else {
            CatalogError::Transport(err)
        }
    }
}

impl CatalogError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, CatalogError::Authentication { .. })
    }

    /// Configuration and authentication problems never fix themselves.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Transport(err) => err.is_transient(),
            CatalogError::NotConfigured(_) | CatalogError::Authentication { .. } | CatalogError::Setup(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> TransportError {
        TransportError::Status {
            status: code,
            url: "https://api.example/3/movie/1".to_string(),
            message: "nope".to_string(),
        }
    }

    #[test]
    fn test_unauthorized_becomes_authentication() {
        let err = CatalogError::from(status(401));
        assert!(err.is_authentication());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("missing or invalid"));
    }

    #[test]
    fn test_other_statuses_pass_through() {
        let err = CatalogError::from(status(500));
        assert!(matches!(err, CatalogError::Transport(TransportError::Status { status: 500, .. })));
        assert!(err.is_retryable());

        let err = CatalogError::from(status(404));
        assert!(!err.is_authentication());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_configured_is_not_retryable() {
        let err = CatalogError::from(ApiKeyError::Missing);
        assert!(!err.is_retryable());
        assert!(!err.is_authentication());
    }
}

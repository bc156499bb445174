use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response other than 429.
    #[error("marketplace API error {status} from {url}: {message}")]
    Api {
        status: u16,
        message: String,
        url: String,
    },

    #[error("rate limited by marketplace at {url}")]
    RateLimited { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("campaign {campaign_id} response carries no business id")]
    MissingBusinessId { campaign_id: u64 },

    #[error("pagination limit reached for {endpoint}: exceeded {max_pages} pages")]
    PaginationLimit { endpoint: String, max_pages: usize },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// How callers should react to a [`MarketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient; worth another attempt after a pause.
    Retryable,
    Fatal,
    /// The response arrived but part of it is unusable.
    PartialData,
}

impl MarketError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            MarketError::RateLimited { .. } => ErrorClass::Retryable,
            MarketError::Http(e) if e.is_timeout() || e.is_connect() => ErrorClass::Retryable,
            MarketError::Deserialize { .. } => ErrorClass::PartialData,
            MarketError::Http(_)
            | MarketError::Api { .. }
            | MarketError::MissingBusinessId { .. }
            | MarketError::PaginationLimit { .. }
            | MarketError::InvalidBaseUrl { .. } => ErrorClass::Fatal,
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Retryable
    }

    /// HTTP status carried by the error, when there is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            MarketError::Api { status, .. } => Some(*status),
            MarketError::RateLimited { .. } => Some(429),
            MarketError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

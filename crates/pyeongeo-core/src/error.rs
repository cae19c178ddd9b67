//! Error types shared across pyeongeo crates.
//!
//! `ProviderError` lives here rather than in `pyeongeo-providers` so the
//! generation pipeline can classify provider failures without string matching.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{Tier, MAX_SENTENCES_PER_TIER, MIN_SENTENCES_PER_TIER};

/// Errors that can occur when interacting with a text-generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No API key was configured for the provider.
    #[error("missing API key for provider '{provider}'; set {env_var} or add api_key to the config")]
    MissingCredential { provider: String, env_var: String },

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_)
                | ProviderError::MissingCredential { .. }
                | ProviderError::ModelNotFound(_)
        )
    }
}

/// Why a sentence generation request produced no sentences.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider call itself failed.
    #[error("generation request failed: {0:#}")]
    Provider(anyhow::Error),

    /// The reply contained no `{...}` object.
    #[error("reply contained no JSON object")]
    NoJsonObject,

    /// The extracted object was not a valid tiered sentence set.
    #[error("reply JSON is malformed: {0}")]
    MalformedReply(#[from] serde_json::Error),

    /// The reply parsed but contained no sentences for any tier.
    #[error("reply contained no sentences")]
    EmptyReply,

    /// Reading or writing the cache failed.
    #[error("cache error: {0:#}")]
    Cache(anyhow::Error),
}

impl GenerationError {
    /// The underlying provider error, if this failure came from the provider.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            GenerationError::Provider(e) => e.downcast_ref::<ProviderError>(),
            _ => None,
        }
    }
}

/// Failures loading curriculum or guideline documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file does not exist.
    #[error("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON of the expected shape.
    #[error("document is malformed: {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document was requested but failed to load earlier.
    #[error("{name} is unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// A requested sentence count outside the allowed range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "'{tier}' sentence count must be between {min} and {max}, got {value}",
    min = MIN_SENTENCES_PER_TIER,
    max = MAX_SENTENCES_PER_TIER
)]
pub struct CountOutOfRange {
    pub tier: Tier,
    pub value: u32,
}

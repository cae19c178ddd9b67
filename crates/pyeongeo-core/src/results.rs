//! Result types produced by the generation pipeline.

use serde::{Deserialize, Serialize};

use crate::model::{CacheKey, SentenceSet};

/// Token usage reported by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Where a set of sentences came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentenceSource {
    /// Reused verbatim from the cache; no provider call was made.
    Cached,
    /// Freshly generated by the provider and written to the cache.
    Generated,
}

/// Outcome of a successful sentence request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedSentences {
    /// The rendered cache key, e.g. `3학년_수학_4수01-01_2_2_2`.
    pub cache_key: String,
    pub sentences: SentenceSet,
    pub source: SentenceSource,
    /// Provider usage; `None` for cache hits.
    #[serde(default)]
    pub token_usage: Option<TokenUsage>,
}

impl GeneratedSentences {
    pub(crate) fn cached(key: &CacheKey, sentences: SentenceSet) -> Self {
        Self {
            cache_key: key.to_string(),
            sentences,
            source: SentenceSource::Cached,
            token_usage: None,
        }
    }

    pub(crate) fn generated(key: &CacheKey, sentences: SentenceSet, usage: TokenUsage) -> Self {
        Self {
            cache_key: key.to_string(),
            sentences,
            source: SentenceSource::Generated,
            token_usage: Some(usage),
        }
    }
}

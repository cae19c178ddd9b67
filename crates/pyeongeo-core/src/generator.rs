//! Cache-backed sentence generation.
//!
//! For a given cache key the request moves Uncached → Requesting → Cached on
//! success. A failed request is not persisted, so the next request for the
//! same key calls the provider again. Concurrent requests for the same
//! uncached key are not de-duplicated.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::error::GenerationError;
use crate::model::{
    AchievementStandard, CacheKey, Guidelines, SentenceCounts, SentenceSet, StandardKey,
};
use crate::prompt::build_prompt;
use crate::results::GeneratedSentences;
use crate::traits::{extract_json_object, GenerateRequest, LlmProvider, DEFAULT_SYSTEM_PROMPT};

/// Configuration for the sentence generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Max tokens for generation.
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".into(),
            temperature: 1.0,
            max_tokens: 4096,
        }
    }
}

/// Turns a standard and requested counts into tiered sentences.
pub struct SentenceGenerator<C: CacheStore> {
    provider: Arc<dyn LlmProvider>,
    cache: C,
    guidelines: Guidelines,
    config: GeneratorConfig,
}

impl<C: CacheStore> SentenceGenerator<C> {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        cache: C,
        guidelines: Guidelines,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            guidelines,
            config,
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Return cached sentences for the request, or generate and cache them.
    pub async fn request_sentences(
        &self,
        key: &StandardKey,
        standard: &AchievementStandard,
        counts: SentenceCounts,
    ) -> Result<GeneratedSentences, GenerationError> {
        let cache_key = CacheKey::new(key.clone(), counts);
        let rendered_key = cache_key.to_string();

        if let Some(sentences) = self
            .cache
            .get(&rendered_key)
            .map_err(GenerationError::Cache)?
        {
            tracing::info!(key = %rendered_key, "loaded sentences from cache");
            return Ok(GeneratedSentences::cached(&cache_key, sentences));
        }

        tracing::info!(
            key = %rendered_key,
            provider = self.provider.name(),
            model = %self.config.model,
            "requesting new sentences"
        );

        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(&self.guidelines, standard, counts),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(GenerationError::Provider)?;

        let sentences = parse_reply(&response.content)?;

        self.cache
            .put(&rendered_key, sentences.clone())
            .map_err(GenerationError::Cache)?;
        tracing::info!(
            key = %rendered_key,
            sentences = sentences.len(),
            latency_ms = response.latency_ms,
            "cached new sentences"
        );

        Ok(GeneratedSentences::generated(
            &cache_key,
            sentences,
            response.token_usage,
        ))
    }
}

/// Parse a provider reply into a sentence set.
pub fn parse_reply(reply: &str) -> Result<SentenceSet, GenerationError> {
    let object = extract_json_object(reply).ok_or(GenerationError::NoJsonObject)?;
    let sentences: SentenceSet = serde_json::from_str(object)?;
    if sentences.is_empty() {
        return Err(GenerationError::EmptyReply);
    }
    Ok(sentences)
}

//! Configuration and shared resources for a single CLI invocation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use pyeongeo_core::cache::{JsonFileCache, MemoryCache};
use pyeongeo_core::curriculum::CurriculumLibrary;
use pyeongeo_core::generator::{GeneratorConfig, SentenceGenerator};
use pyeongeo_core::model::Guidelines;
use pyeongeo_core::traits::LlmProvider;
use pyeongeo_providers::config::load_config_from;
use pyeongeo_providers::mock::MockProvider;
use pyeongeo_providers::PyeongeoConfig;

pub struct AppContext {
    pub config: PyeongeoConfig,
}

impl AppContext {
    /// Load the config file, then apply command-line path overrides.
    pub fn load(
        config_path: Option<&Path>,
        data_dir: Option<PathBuf>,
        cache_file: Option<PathBuf>,
    ) -> Result<Self> {
        let mut config = load_config_from(config_path)?;
        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }
        if let Some(file) = cache_file {
            config.cache_file = file;
        }
        tracing::debug!(?config, "loaded configuration");
        Ok(Self { config })
    }

    pub fn library(&self) -> CurriculumLibrary {
        CurriculumLibrary::load(&self.config.data_dir)
    }

    pub fn cache(&self) -> JsonFileCache {
        JsonFileCache::new(&self.config.cache_file)
    }

    /// The configured provider; fails on a missing credential.
    pub fn provider(&self) -> Result<Arc<dyn LlmProvider>> {
        Ok(Arc::from(self.config.build_provider()?))
    }

    pub fn generator(
        &self,
        provider: Arc<dyn LlmProvider>,
        guidelines: Guidelines,
    ) -> SentenceGenerator<JsonFileCache> {
        let config = GeneratorConfig {
            model: self.config.default_model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        SentenceGenerator::new(provider, self.cache(), guidelines, config)
    }

    /// Generator backed by the canned mock reply and an in-memory cache.
    /// Needs no credential and never touches the cache file.
    pub fn dry_run_generator(&self, guidelines: Guidelines) -> SentenceGenerator<MemoryCache> {
        let provider: Arc<dyn LlmProvider> = Arc::new(MockProvider::new(HashMap::new()));
        let config = GeneratorConfig {
            model: "mock-model".into(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        SentenceGenerator::new(provider, MemoryCache::new(), guidelines, config)
    }
}

//! Configuration and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use pyeongeo_core::cache::DEFAULT_CACHE_FILE;
use pyeongeo_core::error::ProviderError;
use pyeongeo_core::traits::LlmProvider;

use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// File name searched for in the working directory.
pub const CONFIG_FILE_NAME: &str = "pyeongeo.toml";

const GEMINI_KEY_VARS: [&str; 2] = ["PYEONGEO_GEMINI_KEY", "GEMINI_API_KEY"];
const OPENAI_KEY_VAR: &str = "PYEONGEO_OPENAI_KEY";

/// Configuration for a single text-generation provider.
///
/// Debug output masks API keys.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
        }
    }
}

impl ProviderConfig {
    fn api_key(&self) -> &str {
        match self {
            ProviderConfig::Gemini { api_key, .. } | ProviderConfig::OpenAI { api_key, .. } => {
                api_key
            }
        }
    }

    fn key_env_var(&self) -> &'static str {
        match self {
            ProviderConfig::Gemini { .. } => GEMINI_KEY_VARS[1],
            ProviderConfig::OpenAI { .. } => OPENAI_KEY_VAR,
        }
    }
}

/// Top-level pyeongeo configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PyeongeoConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for generation.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used for generation.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Directory holding the curriculum and guideline documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Generated sentence cache.
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_temperature() -> f64 {
    1.0
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_cache_file() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_FILE)
}

impl Default for PyeongeoConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            data_dir: default_data_dir(),
            cache_file: default_cache_file(),
        }
    }
}

impl PyeongeoConfig {
    /// Build the configured default provider.
    ///
    /// Fails with [`ProviderError::MissingCredential`] when no usable key is
    /// configured, so callers can abort before any interaction starts.
    pub fn build_provider(&self) -> Result<Box<dyn LlmProvider>> {
        let name = self.default_provider.as_str();
        match self.providers.get(name) {
            Some(config) => create_provider(name, config),
            None => match name {
                "gemini" => Err(missing_credential(name, GEMINI_KEY_VARS[1])),
                "openai" => Err(missing_credential(name, OPENAI_KEY_VAR)),
                other => anyhow::bail!("unknown provider '{other}' (expected gemini or openai)"),
            },
        }
    }
}

fn missing_credential(provider: &str, env_var: &str) -> anyhow::Error {
    ProviderError::MissingCredential {
        provider: provider.to_string(),
        env_var: env_var.to_string(),
    }
    .into()
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
    }
}

/// Overwrite provider keys from environment variables.
///
/// `lookup` stands in for `std::env::var` so the precedence can be tested
/// without touching the process environment.
fn apply_env_overrides(config: &mut PyeongeoConfig, lookup: impl Fn(&str) -> Option<String>) {
    let gemini_key = GEMINI_KEY_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|v| !v.is_empty()));
    if let Some(key) = gemini_key {
        let entry = config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let ProviderConfig::Gemini { api_key, .. } = entry {
            *api_key = key;
        }
    }

    if let Some(key) = lookup(OPENAI_KEY_VAR).filter(|v| !v.is_empty()) {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let ProviderConfig::OpenAI { api_key, .. } = entry {
            *api_key = key;
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order when no path is given:
/// 1. `pyeongeo.toml` in the current directory
/// 2. `~/.config/pyeongeo/config.toml`
///
/// Environment variable overrides: `PYEONGEO_GEMINI_KEY` (or
/// `GEMINI_API_KEY`), `PYEONGEO_OPENAI_KEY`.
pub fn load_config_from(path: Option<&Path>) -> Result<PyeongeoConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<PyeongeoConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => PyeongeoConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok());

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("pyeongeo"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    if config.api_key().trim().is_empty() {
        return Err(missing_credential(name, config.key_env_var()));
    }

    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiProvider::new(api_key, base_url.clone())?))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        )?)),
    }
}

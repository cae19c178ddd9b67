//! pyeongeo-providers — text-generation provider integrations.
//!
//! Implements the `LlmProvider` trait for Gemini and OpenAI-compatible
//! endpoints, plus a mock for tests, and loads the `pyeongeo.toml` config.

pub mod config;
pub mod gemini;
mod http;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config_from, PyeongeoConfig, ProviderConfig};
pub use pyeongeo_core::error::ProviderError;

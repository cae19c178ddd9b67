//! The `pyeongeo init` command.

use std::path::Path;

use anyhow::{Context, Result};

use pyeongeo_core::curriculum::GUIDELINES_FILE;
use pyeongeo_core::model::GradeBand;
use pyeongeo_providers::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(config_path, SAMPLE_CONFIG)
            .with_context(|| format!("failed to write {CONFIG_FILE_NAME}"))?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    let data_dir = Path::new("data");
    if !data_dir.exists() {
        std::fs::create_dir_all(data_dir).context("failed to create data directory")?;
        println!("Created data/");
    }

    println!("\nNext steps:");
    println!("  1. Set GEMINI_API_KEY or edit {CONFIG_FILE_NAME}");
    println!("  2. Copy the curriculum documents into data/:");
    for band in GradeBand::ALL {
        println!("       {}", band.document_file());
    }
    println!("       {GUIDELINES_FILE}");
    println!("  3. Run: pyeongeo validate");
    println!("  4. Run: pyeongeo session");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# pyeongeo configuration

default_provider = "gemini"
default_model = "gemini-1.5-flash"
temperature = 1.0
max_tokens = 4096
data_dir = "data"
cache_file = "data/generated_cache.json"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

# [providers.openai]
# type = "openai"
# api_key = "${OPENAI_API_KEY}"
"#;

//! `buddybot config`: Configuration management commands.

use std::path::{Path, PathBuf};

use buddybot_config::AppConfig;

use super::{CmdResult, load_config};

fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

pub fn show(path: Option<&Path>) -> CmdResult {
    let config = load_config(path)?;
    println!("{}", render_redacted(&config)?);
    Ok(())
}

pub fn path(path: Option<&Path>) {
    println!("{}", config_path(path).display());
}

pub fn validate(path: Option<&Path>) -> CmdResult {
    println!("Validating configuration...");

    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e);
        }
    };
    println!("   ✅ Config parsed successfully");

    let warnings = warnings(&config);
    if warnings.is_empty() {
        println!("   ✅ All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   ⚠️  {w}");
        }
    }
    Ok(())
}

/// Write the default config unless a file already exists.
pub fn init(path: Option<&Path>) -> CmdResult {
    let path = config_path(path);
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("✅ Wrote default config: {}", path.display());
    Ok(())
}

fn render_redacted(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut config = config.clone();
    if config.llm.api_key.is_some() {
        config.llm.api_key = Some("[REDACTED]".into());
    }
    toml::to_string_pretty(&config)
}

/// Settings that load fine but will not work well.
fn warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.has_api_key() {
        warnings.push("No API key set (set BUDDYBOT_API_KEY or OPENAI_API_KEY)".to_string());
    }
    if config.ingestion.sources.is_empty() {
        warnings.push("No ingestion sources configured".to_string());
    }
    for source in &config.ingestion.sources {
        if !source.path.exists() {
            warnings.push(format!(
                "Export for {} not found: {}",
                source.item,
                source.path.display()
            ));
        }
    }
    if config.retrieval.max_gap > config.retrieval.similarity_threshold {
        warnings.push("retrieval.max_gap exceeds similarity_threshold and never cuts".to_string());
    }
    warnings
}

//! LLM Provider implementations for BuddyBot.
//!
//! All providers implement the `buddybot_core::Provider` trait.

pub mod openai_compat;

use std::sync::Arc;
use std::time::Duration;

use buddybot_config::AppConfig;
use buddybot_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the configured provider.
///
/// A missing API key is not an error here: requests will fail with
/// `AuthenticationFailed`, which the chat service turns into its fallback
/// answer.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    let llm = &config.llm;
    if llm.api_key.is_none() {
        tracing::warn!("No API key configured; set BUDDYBOT_API_KEY or OPENAI_API_KEY");
    }

    Arc::new(OpenAiCompatProvider::with_timeout(
        provider_name(&llm.api_url),
        &llm.api_url,
        llm.api_key.clone().unwrap_or_default(),
        Duration::from_secs(llm.timeout_secs),
    ))
}

/// Name well-known endpoints; everything else is "custom".
fn provider_name(api_url: &str) -> &'static str {
    if api_url.contains("api.openai.com") {
        "openai"
    } else if api_url.contains("localhost:11434") || api_url.contains("127.0.0.1:11434") {
        "ollama"
    } else {
        "custom"
    }
}

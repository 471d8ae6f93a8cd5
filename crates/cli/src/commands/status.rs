//! `buddybot status`: Show system status.

use buddybot_config::AppConfig;
use buddybot_core::ingest::LastLoadOutcome;
use buddybot_core::store::{LoadLogStore, VectorIndex};

use super::{CmdResult, Runtime};

pub async fn run(runtime: &Runtime) -> CmdResult {
    let config = &runtime.config;
    let last = runtime.history.last_outcome().await?;

    println!("BuddyBot Status");
    println!("===============");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Data dir:     {}", config.storage.data_dir.display());
    println!(
        "  Provider:     {} ({})",
        runtime.provider.name(),
        config.llm.api_url
    );
    println!("  Model:        {}", config.llm.model);
    println!("  API key:      {}", if config.has_api_key() { "set" } else { "missing" });
    println!("  Embedder:     {:?}", config.retrieval.embedder);
    println!("  Indexed:      {} chunks", runtime.index.len().await);
    println!("  Sources:      {}", config.ingestion.sources.len());
    println!("  Last load:    {}", badge(last.as_ref()));

    Ok(())
}

fn badge(last: Option<&LastLoadOutcome>) -> String {
    match last {
        None => "never".into(),
        Some(last) => format!(
            "{} at {}",
            if last.outcome { "succeeded" } else { "failed" },
            last.ended_at.format("%Y/%m/%d %H:%M")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn badge_without_runs() {
        assert_eq!(badge(None), "never");
    }

    #[test]
    fn badge_shows_outcome_and_time() {
        let last = LastLoadOutcome {
            outcome: false,
            ended_at: chrono::Utc.with_ymd_and_hms(2025, 3, 1, 6, 30, 0).unwrap(),
        };
        assert_eq!(badge(Some(&last)), "failed at 2025/03/01 06:30");
    }
}

//! Relevance filtering of similarity-search hits.
//!
//! Distance is the only signal. A hit is admitted when it is under the
//! similarity threshold and its distance does not jump more than `max_gap`
//! away from the previously admitted hit. The first jump ends the scan:
//! everything ranked after a semantic cliff is treated as off-topic.

use buddybot_core::document::ScoredDocument;
use buddybot_core::error::RetrievalError;
use tracing::debug;

/// How to treat a hit that carries no `distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingDistance {
    /// Fail with [`RetrievalError::MissingDistance`].
    Reject,
    /// Pretend the hit has this distance.
    Fallback(f64),
}

/// Thresholds fixed at service construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceConfig {
    /// Maximum admissible distance.
    pub similarity_threshold: f64,
    /// Maximum distance increase between consecutive admitted hits.
    pub max_gap: f64,
    pub missing_distance: MissingDistance,
}

impl RelevanceConfig {
    /// Both bounds must be non-negative numbers. A NaN bound would admit
    /// every hit, since no distance compares greater than NaN.
    pub fn new(similarity_threshold: f64, max_gap: f64) -> Self {
        debug_assert!(
            similarity_threshold >= 0.0,
            "similarity_threshold must be non-negative, got {similarity_threshold}"
        );
        debug_assert!(max_gap >= 0.0, "max_gap must be non-negative, got {max_gap}");
        Self {
            similarity_threshold,
            max_gap,
            missing_distance: MissingDistance::Reject,
        }
    }

    pub fn with_missing_distance(mut self, policy: MissingDistance) -> Self {
        if let MissingDistance::Fallback(distance) = policy {
            debug_assert!(distance >= 0.0, "fallback distance must be non-negative, got {distance}");
        }
        self.missing_distance = policy;
        self
    }
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self::new(1.2, 0.3)
    }
}

impl From<&buddybot_config::RetrievalConfig> for RelevanceConfig {
    fn from(config: &buddybot_config::RetrievalConfig) -> Self {
        let missing_distance = match config.missing_distance {
            buddybot_config::MissingDistanceMode::Reject => MissingDistance::Reject,
            buddybot_config::MissingDistanceMode::Fallback => {
                MissingDistance::Fallback(config.fallback_distance)
            }
        };
        Self::new(config.similarity_threshold, config.max_gap)
            .with_missing_distance(missing_distance)
    }
}

/// Stateless filter holding its [`RelevanceConfig`].
#[derive(Debug, Clone, Default)]
pub struct RelevanceFilter {
    config: RelevanceConfig,
}

impl RelevanceFilter {
    pub fn new(config: RelevanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelevanceConfig {
        &self.config
    }

    /// Ordered subset of `documents` considered relevant. See [`filter`].
    pub fn filter(&self, documents: &[ScoredDocument]) -> Result<Vec<ScoredDocument>, RetrievalError> {
        filter(documents, &self.config)
    }
}

/// Single pass over `documents`, assumed sorted by ascending distance.
///
/// Hits above the threshold are skipped and the scan continues; the first
/// admissible hit whose distance differs from the previous admitted one by
/// more than `max_gap` stops the scan. Output order matches input order.
pub fn filter(
    documents: &[ScoredDocument],
    config: &RelevanceConfig,
) -> Result<Vec<ScoredDocument>, RetrievalError> {
    let mut previous: Option<f64> = None;
    let mut result = Vec::new();

    for (index, document) in documents.iter().enumerate() {
        let distance = match (document.distance(index)?, config.missing_distance) {
            (Some(d), _) => d,
            (None, MissingDistance::Fallback(d)) => d,
            (None, MissingDistance::Reject) => {
                return Err(RetrievalError::MissingDistance { index });
            }
        };

        if distance > config.similarity_threshold {
            continue;
        }

        if let Some(prev) = previous {
            if (distance - prev).abs() > config.max_gap {
                debug!(index, distance, previous = prev, "Distance gap exceeded, stopping scan");
                break;
            }
        }

        result.push(document.clone());
        previous = Some(distance);
    }

    debug!(input = documents.len(), admitted = result.len(), "Relevance filter applied");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddybot_core::document::Metadata;
    use serde_json::json;

    fn doc(content: &str, distance: f64) -> ScoredDocument {
        ScoredDocument::with_distance(content, Metadata::new(), distance)
    }

    fn contents(docs: &[ScoredDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.content.as_str()).collect()
    }

    fn cfg() -> RelevanceConfig {
        RelevanceConfig::new(1.2, 0.3)
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(filter(&[], &cfg()).unwrap().is_empty());
    }

    #[test]
    fn all_above_threshold_is_empty() {
        let docs = vec![doc("a", 1.3), doc("b", 2.0)];
        assert!(filter(&docs, &cfg()).unwrap().is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let docs = vec![doc("a", 1.2)];
        assert_eq!(contents(&filter(&docs, &cfg()).unwrap()), vec!["a"]);
    }

    #[test]
    fn gap_is_a_hard_stop() {
        let docs = vec![doc("a", 0.1), doc("b", 0.2), doc("c", 0.9)];
        assert_eq!(contents(&filter(&docs, &cfg()).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn gap_stop_is_not_resumed_by_later_close_hits() {
        let docs = vec![doc("a", 0.1), doc("b", 0.9), doc("c", 0.95)];
        assert_eq!(contents(&filter(&docs, &cfg()).unwrap()), vec!["a"]);
    }

    #[test]
    fn gap_measured_from_previous_admitted() {
        // "b" is skipped by threshold, so "c" is compared with "a".
        let docs = vec![doc("a", 0.1), doc("b", 5.0), doc("c", 0.3)];
        let config = RelevanceConfig::new(1.2, 0.3);
        assert_eq!(contents(&filter(&docs, &config).unwrap()), vec!["a", "c"]);
    }

    #[test]
    fn single_document_ignores_gap() {
        let docs = vec![doc("only", 0.05)];
        let config = RelevanceConfig::new(1.2, 0.0);
        assert_eq!(contents(&filter(&docs, &config).unwrap()), vec!["only"]);
    }

    #[test]
    fn ties_always_pass() {
        let docs = vec![doc("a", 0.4), doc("b", 0.4), doc("c", 0.4)];
        let config = RelevanceConfig::new(1.2, 0.0);
        assert_eq!(filter(&docs, &config).unwrap().len(), 3);
    }

    #[test]
    fn gap_equal_to_max_passes() {
        let docs = vec![doc("a", 0.0), doc("b", 0.25)];
        let config = RelevanceConfig::new(1.2, 0.25);
        assert_eq!(filter(&docs, &config).unwrap().len(), 2);
    }

    #[test]
    fn metadata_is_preserved() {
        let mut metadata = Metadata::new();
        metadata.insert("url".into(), json!("https://jira/BUD-1"));
        let docs = vec![ScoredDocument::with_distance("a", metadata, 0.2)];
        let out = filter(&docs, &cfg()).unwrap();
        assert_eq!(out[0].metadata["url"], json!("https://jira/BUD-1"));
        assert_eq!(out[0], docs[0]);
    }

    #[test]
    fn missing_distance_rejected_by_default() {
        let docs = vec![doc("a", 0.1), ScoredDocument::new("b", Metadata::new())];
        assert_eq!(
            filter(&docs, &cfg()).unwrap_err(),
            RetrievalError::MissingDistance { index: 1 }
        );
    }

    #[test]
    fn missing_distance_fallback() {
        let docs = vec![ScoredDocument::new("a", Metadata::new()), doc("b", 1.1)];
        let config = cfg().with_missing_distance(MissingDistance::Fallback(1.0));
        assert_eq!(contents(&filter(&docs, &config).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn non_numeric_distance_is_an_error() {
        let mut metadata = Metadata::new();
        metadata.insert("distance".into(), json!("close"));
        let docs = vec![ScoredDocument::new("a", metadata)];
        assert!(matches!(
            filter(&docs, &cfg()),
            Err(RetrievalError::InvalidDistance { index: 0, .. })
        ));
    }

    #[test]
    fn from_retrieval_config() {
        let mut retrieval = buddybot_config::RetrievalConfig::default();
        retrieval.missing_distance = buddybot_config::MissingDistanceMode::Fallback;
        retrieval.fallback_distance = 0.7;
        let config = RelevanceConfig::from(&retrieval);
        assert_eq!(config.similarity_threshold, 1.2);
        assert_eq!(config.missing_distance, MissingDistance::Fallback(0.7));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "similarity_threshold must be non-negative")]
    fn nan_threshold_is_refused() {
        RelevanceConfig::new(f64::NAN, 0.3);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "max_gap must be non-negative")]
    fn negative_gap_is_refused() {
        RelevanceConfig::new(1.2, -0.1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "fallback distance must be non-negative")]
    fn negative_fallback_is_refused() {
        cfg().with_missing_distance(MissingDistance::Fallback(-1.0));
    }
}

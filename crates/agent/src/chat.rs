//! Question answering over the vector index.
//!
//! # Flow
//!
//! 1. Similarity search for the question
//! 2. Relevance filter (threshold + gap cutoff)
//! 3. Context budget (greedy prefix, annotated documents)
//! 4. Prompt assembly and a single provider completion

use std::sync::Arc;

use buddybot_config::{AppConfig, LlmConfig};
use buddybot_core::chat::{Answer, Header, Question};
use buddybot_core::document::AnnotatedDocument;
use buddybot_core::provider::{PromptMessage, Provider, ProviderRequest, Usage};
use buddybot_core::store::SimilaritySearch;
use tracing::{debug, info, warn};

use crate::context::{ContextBudgeter, TokenBudget};
use crate::prompt::answer_prompt;
use crate::relevance::{RelevanceConfig, RelevanceFilter};

/// Reply used when retrieval or generation fails.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I could not retrieve an answer right now. Please try again later.";

/// Result of answering one question.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub answer: Answer,
    /// The context documents placed into the prompt.
    pub context: Vec<AnnotatedDocument>,
    /// Hits returned by similarity search.
    pub retrieved: usize,
    /// Hits admitted by the relevance filter.
    pub relevant: usize,
    /// Relevant hits that did not fit in the budget.
    pub dropped: usize,
    /// Estimated prompt tokens.
    pub used_tokens: usize,
    pub usage: Option<Usage>,
}

/// Answers questions with retrieved context.
pub struct ChatService {
    search: Arc<dyn SimilaritySearch>,
    provider: Arc<dyn Provider>,
    filter: RelevanceFilter,
    budgeter: ContextBudgeter,
    header: Header,
    model: String,
    temperature: f32,
    max_response_tokens: Option<u32>,
}

impl ChatService {
    pub fn new(
        search: Arc<dyn SimilaritySearch>,
        provider: Arc<dyn Provider>,
        header: Header,
    ) -> Self {
        let llm = LlmConfig::default();
        Self {
            search,
            provider,
            filter: RelevanceFilter::default(),
            budgeter: ContextBudgeter::new(TokenBudget::default()),
            header,
            model: llm.model,
            temperature: llm.temperature,
            max_response_tokens: None,
        }
    }

    /// Wire a service from the application configuration.
    pub fn from_config(
        config: &AppConfig,
        search: Arc<dyn SimilaritySearch>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self::new(search, provider, Header::new(&config.prompts.answer_header))
            .with_relevance(RelevanceConfig::from(&config.retrieval))
            .with_budget(TokenBudget::new(config.budget.max_tokens))
            .with_model(&config.llm.model, config.llm.temperature)
            .with_max_response_tokens(config.llm.max_response_tokens)
    }

    pub fn with_relevance(mut self, config: RelevanceConfig) -> Self {
        self.filter = RelevanceFilter::new(config);
        self
    }

    pub fn with_budget(mut self, budget: TokenBudget) -> Self {
        self.budgeter = ContextBudgeter::new(budget);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>, temperature: f32) -> Self {
        self.model = model.into();
        self.temperature = temperature;
        self
    }

    pub fn with_max_response_tokens(mut self, max_tokens: u32) -> Self {
        self.max_response_tokens = Some(max_tokens);
        self
    }

    /// Search, filter, budget and generate.
    ///
    /// An empty context is not an error: the model is still asked and is
    /// expected to answer that no information was found.
    pub async fn answer(&self, question: &Question) -> buddybot_core::Result<ChatOutcome> {
        info!(model = %self.model, "Answering question");

        let hits = self.search.search(question.as_str()).await?;
        let retrieved = hits.len();

        let relevant = self.filter.filter(&hits)?;
        let relevant_count = relevant.len();

        let budgeted = self
            .budgeter
            .budget(self.header.as_str(), question.as_str(), relevant);

        debug!(
            retrieved,
            relevant = relevant_count,
            selected = budgeted.documents.len(),
            used_tokens = budgeted.used_tokens,
            "Context prepared"
        );

        let prompt = answer_prompt(&self.header, question, &budgeted.documents);
        let response = self
            .provider
            .complete(ProviderRequest {
                model: self.model.clone(),
                messages: vec![PromptMessage::user(prompt)],
                temperature: self.temperature,
                max_tokens: self.max_response_tokens,
            })
            .await?;

        info!(
            context = budgeted.documents.len(),
            model = %response.model,
            "Answer generated"
        );

        Ok(ChatOutcome {
            answer: Answer::new(response.content),
            context: budgeted.documents,
            retrieved,
            relevant: relevant_count,
            dropped: budgeted.dropped,
            used_tokens: budgeted.used_tokens,
            usage: response.usage,
        })
    }

    /// Like [`answer`](Self::answer), but any failure degrades to
    /// [`FALLBACK_ANSWER`].
    pub async fn answer_or_fallback(&self, question: &Question) -> Answer {
        match self.answer(question).await {
            Ok(outcome) => outcome.answer,
            Err(e) => {
                warn!(error = %e, "Answering failed, returning fallback");
                Answer::new(FALLBACK_ANSWER)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, StaticSearch, hit};
    use buddybot_core::error::ProviderError;

    fn service(hits: Vec<buddybot_core::ScoredDocument>, provider: Arc<ScriptedProvider>) -> ChatService {
        ChatService::new(Arc::new(StaticSearch::new(hits)), provider, Header::new("HEADER"))
            .with_relevance(RelevanceConfig::new(1.2, 0.3))
    }

    #[tokio::test]
    async fn answers_with_filtered_context() {
        let provider = Arc::new(ScriptedProvider::replying("It is Ada."));
        let svc = service(
            vec![hit("A", 0.1), hit("B", 0.15), hit("C", 0.5), hit("D", 1.5)],
            provider.clone(),
        );

        let outcome = svc.answer(&Question::new("Who?")).await.unwrap();
        assert_eq!(outcome.answer.as_str(), "It is Ada.");
        assert_eq!(outcome.retrieved, 4);
        assert_eq!(outcome.relevant, 2);
        assert_eq!(outcome.context.len(), 2);

        let prompt = provider.last_prompt().unwrap();
        assert!(prompt.starts_with("HEADER\n\n\nWho?\n\n\nMetadata: "));
        assert!(prompt.contains("Content: A"));
        assert!(prompt.contains("Content: B"));
        assert!(!prompt.contains("Content: C"));
    }

    #[tokio::test]
    async fn empty_context_still_generates() {
        let provider = Arc::new(ScriptedProvider::replying("Information not found"));
        let svc = service(vec![hit("far", 3.0)], provider.clone());
        let outcome = svc.answer(&Question::new("Q")).await.unwrap();
        assert!(outcome.context.is_empty());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn missing_distance_propagates() {
        let provider = Arc::new(ScriptedProvider::replying("unused"));
        let bare = buddybot_core::ScoredDocument::new("x", Default::default());
        let svc = service(vec![bare], provider.clone());
        let err = svc.answer(&Question::new("Q")).await.unwrap_err();
        assert!(matches!(err, buddybot_core::Error::Retrieval(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn fallback_on_provider_error() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::Timeout("slow".into())));
        let svc = service(vec![hit("A", 0.1)], provider);
        let answer = svc.answer_or_fallback(&Question::new("Q")).await;
        assert_eq!(answer.as_str(), FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn fallback_on_search_error() {
        let provider = Arc::new(ScriptedProvider::replying("unused"));
        let svc = ChatService::new(Arc::new(StaticSearch::failing()), provider, Header::new("H"));
        let answer = svc.answer_or_fallback(&Question::new("Q")).await;
        assert_eq!(answer.as_str(), FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn tight_budget_drops_context() {
        let provider = Arc::new(ScriptedProvider::replying("ok"));
        let svc = service(vec![hit("A", 0.1)], provider).with_budget(TokenBudget::new(3));
        let outcome = svc.answer(&Question::new("Q")).await.unwrap();
        assert!(outcome.context.is_empty());
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn from_config_uses_configured_model() {
        let mut config = AppConfig::default();
        config.llm.model = "gpt-4o-mini".into();
        let provider = Arc::new(ScriptedProvider::replying("ok"));
        let svc = ChatService::from_config(&config, Arc::new(StaticSearch::new(vec![])), provider);
        assert_eq!(svc.model, "gpt-4o-mini");
        assert_eq!(svc.budgeter.token_budget().max_tokens, 128_000);
    }

    #[test]
    fn new_uses_default_llm_settings() {
        let provider = Arc::new(ScriptedProvider::replying("ok"));
        let svc = service(vec![], provider);
        let llm = LlmConfig::default();
        assert_eq!(svc.model, llm.model);
        assert_eq!(svc.temperature, llm.temperature);
    }
}

//! Follow-up question suggestions.
//!
//! The model is asked for a fixed number of questions separated by `___`.

use std::sync::Arc;

use buddybot_config::{AppConfig, LlmConfig};
use buddybot_core::chat::{Header, Question, QuestionAnswerPair};
use buddybot_core::error::Error;
use buddybot_core::provider::{PromptMessage, Provider, ProviderRequest};
use tracing::{debug, warn};

use crate::prompt::suggestions_prompt;

/// Separator the model is instructed to put between questions.
pub const SUGGESTION_SEPARATOR: &str = "___";

pub struct SuggestionService {
    provider: Arc<dyn Provider>,
    header: Header,
    model: String,
    temperature: f32,
}

impl SuggestionService {
    pub fn new(provider: Arc<dyn Provider>, header: Header) -> Self {
        let llm = LlmConfig::default();
        Self {
            provider,
            header,
            model: llm.model,
            temperature: llm.temperature,
        }
    }

    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Self {
        Self::new(provider, Header::new(&config.prompts.suggestions_header))
            .with_model(&config.llm.model, config.llm.temperature)
    }

    pub fn with_model(mut self, model: impl Into<String>, temperature: f32) -> Self {
        self.model = model.into();
        self.temperature = temperature;
        self
    }

    /// Ask for exactly `quantity` follow-ups to `pair`.
    ///
    /// Fails if the model returns a different number of questions.
    pub async fn next_questions(
        &self,
        pair: &QuestionAnswerPair,
        quantity: usize,
    ) -> buddybot_core::Result<Vec<Question>> {
        if quantity == 0 {
            return Err(Error::Internal("quantity must be at least 1".into()));
        }

        let header = self.header.with_quantity(quantity);
        let prompt = suggestions_prompt(&header, pair);

        let response = self
            .provider
            .complete(ProviderRequest {
                model: self.model.clone(),
                messages: vec![PromptMessage::user(prompt)],
                temperature: self.temperature,
                max_tokens: None,
            })
            .await?;

        let questions = split_questions(&response.content);
        debug!(requested = quantity, received = questions.len(), "Suggestions parsed");

        if questions.len() != quantity {
            warn!(requested = quantity, received = questions.len(), "Unexpected suggestion count");
            return Err(Error::Internal(format!(
                "expected {quantity} suggested questions, got {}",
                questions.len()
            )));
        }

        Ok(questions)
    }
}

fn split_questions(reply: &str) -> Vec<Question> {
    reply
        .split(SUGGESTION_SEPARATOR)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(Question::new)
        .collect()
}

//! Context budgeting: fit ranked documents under a token ceiling.
//!
//! Selection is a greedy prefix in rank order. The first document that would
//! bring the running total to the budget or beyond ends the selection, even
//! if a later, smaller document would still fit.

use buddybot_core::document::{AnnotatedDocument, ScoredDocument};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::token::{CharRatioEstimator, TextSizeEstimator};

/// Hard ceiling on header + question + selected context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBudget {
    pub max_tokens: usize,
}

impl TokenBudget {
    pub fn new(max_tokens: usize) -> Self {
        Self { max_tokens }
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(128_000)
    }
}

/// The documents that made it into the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetedContext {
    /// Selected documents, annotated, in rank order.
    pub documents: Vec<AnnotatedDocument>,
    /// Estimated tokens of header + question + selected documents.
    pub used_tokens: usize,
    /// Documents left out because the budget ran out.
    pub dropped: usize,
}

impl BudgetedContext {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Greedy prefix budgeter.
#[derive(Debug, Clone, Default)]
pub struct ContextBudgeter<E = CharRatioEstimator> {
    budget: TokenBudget,
    estimator: E,
}

impl ContextBudgeter<CharRatioEstimator> {
    pub fn new(budget: TokenBudget) -> Self {
        Self::with_estimator(budget, CharRatioEstimator::default())
    }
}

impl<E: TextSizeEstimator> ContextBudgeter<E> {
    pub fn with_estimator(budget: TokenBudget, estimator: E) -> Self {
        Self { budget, estimator }
    }

    pub fn token_budget(&self) -> TokenBudget {
        self.budget
    }

    /// Annotate each document once, then keep the longest prefix for which
    /// `tokens(header) + tokens(question) + sum(tokens(doc))` stays strictly
    /// below `max_tokens`.
    pub fn budget(
        &self,
        header: &str,
        question: &str,
        documents: Vec<ScoredDocument>,
    ) -> BudgetedContext {
        let total = documents.len();
        let mut running = self.estimator.tokens(header) + self.estimator.tokens(question);
        let mut selected = Vec::with_capacity(total);

        for document in documents {
            let annotated = document.annotate();
            let doc_tokens = self.estimator.tokens(&annotated.content);
            if running + doc_tokens >= self.budget.max_tokens {
                break;
            }
            running += doc_tokens;
            selected.push(annotated);
        }

        let dropped = total - selected.len();
        debug!(
            selected = selected.len(),
            dropped,
            used_tokens = running,
            max_tokens = self.budget.max_tokens,
            "Context budget applied"
        );

        BudgetedContext {
            documents: selected,
            used_tokens: running,
            dropped,
        }
    }
}

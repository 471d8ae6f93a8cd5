//! The retrieval pipeline of BuddyBot.
//!
//! A question flows through four stages:
//!
//! 1. **Search** the vector index (any `SimilaritySearch`)
//! 2. **Filter** hits by distance threshold and gap cutoff
//! 3. **Budget** the survivors into a token ceiling, annotating each with
//!    its metadata
//! 4. **Generate** the answer from the assembled prompt
//!
//! The filter and budgeter are pure and synchronous; only the services
//! around them touch the network.

pub mod chat;
pub mod context;
pub mod prompt;
pub mod relevance;
pub mod suggestions;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chat::{ChatOutcome, ChatService, FALLBACK_ANSWER};
pub use context::{BudgetedContext, CharRatioEstimator, ContextBudgeter, TextSizeEstimator, TokenBudget};
pub use relevance::{MissingDistance, RelevanceConfig, RelevanceFilter};
pub use suggestions::SuggestionService;

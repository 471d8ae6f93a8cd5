//! Prompt context sizing.
//!
//! Relevant documents are annotated with their metadata and packed, in rank
//! order, under a fixed token ceiling shared with the instruction header and
//! the question.

pub mod budgeter;
pub mod token;

pub use budgeter::{BudgetedContext, ContextBudgeter, TokenBudget};
pub use token::{CharRatioEstimator, TextSizeEstimator, estimate_tokens};

//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~3 characters per token, floored, with
//! a minimum of one token per text. It is a stand-in for a real tokenizer,
//! which can be plugged in through [`TextSizeEstimator`].

/// Approximates how many model tokens a text occupies.
pub trait TextSizeEstimator: Send + Sync {
    fn tokens(&self, text: &str) -> usize;
}

/// `max(1, floor(chars / chars_per_token))`.
#[derive(Debug, Clone, Copy)]
pub struct CharRatioEstimator {
    chars_per_token: usize,
}

impl CharRatioEstimator {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(3)
    }
}

impl TextSizeEstimator for CharRatioEstimator {
    fn tokens(&self, text: &str) -> usize {
        (text.chars().count() / self.chars_per_token).max(1)
    }
}

/// Estimate the token count for a string with the default 3-chars ratio.
pub fn estimate_tokens(text: &str) -> usize {
    CharRatioEstimator::default().tokens(text)
}

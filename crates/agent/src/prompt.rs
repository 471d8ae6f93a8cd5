//! Prompt assembly.
//!
//! Sections are separated by two blank lines; context documents by one.

use buddybot_core::chat::{Header, Question, QuestionAnswerPair};
use buddybot_core::document::AnnotatedDocument;

/// `"{header}\n\n\n{question}\n\n\n{context}"`.
pub fn answer_prompt(header: &Header, question: &Question, context: &[AnnotatedDocument]) -> String {
    let context = context
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{}\n\n\n{}\n\n\n{}", header.as_str(), question.as_str(), context)
}

/// `"{header}\n\n\n{question}\n{answer}"`.
pub fn suggestions_prompt(header: &Header, pair: &QuestionAnswerPair) -> String {
    format!(
        "{}\n\n\n{}\n{}",
        header.as_str(),
        pair.question.as_str(),
        pair.answer.as_str()
    )
}

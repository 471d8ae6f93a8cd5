//! `buddybot suggest`: Follow-up questions for the last exchange.

use buddybot_core::chat::{Answer, Message, Question, QuestionAnswerPair, Sender};
use buddybot_core::store::MessageStore;

use super::{CmdResult, Runtime};

/// How far back to look for the last question/answer pair.
const LOOKBACK: usize = 50;

pub async fn run(runtime: &Runtime, quantity: usize) -> CmdResult {
    let recent = runtime.history.recent(LOOKBACK, 0).await?;
    let pair = last_exchange(&recent)
        .ok_or("No question and answer in the history yet; run `buddybot ask` first")?;

    let questions = runtime
        .suggestion_service()
        .next_questions(&pair, quantity)
        .await?;

    for (i, question) in questions.iter().enumerate() {
        println!("{}. {}", i + 1, question.as_str());
    }
    Ok(())
}

/// The latest chatbot message and the user message that precedes it.
fn last_exchange(messages: &[Message]) -> Option<QuestionAnswerPair> {
    let answer_at = messages.iter().rposition(|m| m.sender == Sender::Chatbot)?;
    let question = messages[..answer_at]
        .iter()
        .rev()
        .find(|m| m.sender == Sender::User)?;

    Some(QuestionAnswerPair {
        question: Question::new(&question.content),
        answer: Answer::new(&messages[answer_at].content),
    })
}

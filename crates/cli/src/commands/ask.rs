//! `buddybot ask`: Answer one question.

use buddybot_agent::FALLBACK_ANSWER;
use buddybot_core::chat::{Answer, Message, Question};
use buddybot_core::store::MessageStore;
use tracing::{debug, warn};

use super::{CmdResult, Runtime};

pub async fn run(runtime: &Runtime, question: &str) -> CmdResult {
    if !runtime.config.has_api_key() {
        warn!("No API key configured (set BUDDYBOT_API_KEY or OPENAI_API_KEY)");
    }

    let answer = ask(runtime, &Question::new(question)).await?;
    println!("{}", answer.as_str());
    Ok(())
}

/// Answer `question` and record both sides of the exchange.
///
/// Retrieval or generation failures are answered with the fallback text; only
/// a failure to write the history is an error.
pub async fn ask(runtime: &Runtime, question: &Question) -> Result<Answer, Box<dyn std::error::Error>> {
    runtime.history.save(Message::user(question.as_str())).await?;

    let answer = match runtime.chat_service().answer(question).await {
        Ok(outcome) => {
            debug!(
                retrieved = outcome.retrieved,
                relevant = outcome.relevant,
                context = outcome.context.len(),
                dropped = outcome.dropped,
                used_tokens = outcome.used_tokens,
                "Answered"
            );
            outcome.answer
        }
        Err(e) => {
            warn!(error = %e, "Answering failed");
            Answer::new(FALLBACK_ANSWER)
        }
    };

    runtime.history.save(Message::chatbot(answer.as_str())).await?;
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use buddybot_core::chat::Sender;

    #[tokio::test]
    async fn saves_both_messages() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = test_support::runtime(dir.path(), "Ask the platform team.");

        let answer = ask(&runtime, &Question::new("Who owns billing?")).await.unwrap();
        assert_eq!(answer.as_str(), "Ask the platform team.");

        let messages = runtime.history.recent(10, 0).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].content, "Who owns billing?");
        assert_eq!(messages[1].sender, Sender::Chatbot);
        assert_eq!(messages[1].content, "Ask the platform team.");
    }
}

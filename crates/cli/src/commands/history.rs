//! `buddybot history`: Page through past messages.

use buddybot_core::chat::Message;
use buddybot_core::store::MessageStore;

use super::{CmdResult, Runtime};

pub async fn run(runtime: &Runtime, quantity: usize, page: usize) -> CmdResult {
    let messages = runtime.history.recent(quantity, page).await?;
    if messages.is_empty() {
        println!("No messages.");
        return Ok(());
    }

    for message in &messages {
        println!("{}", render(message));
    }
    Ok(())
}

fn render(message: &Message) -> String {
    format!(
        "[{}] {}: {}",
        message.timestamp.format("%Y-%m-%d %H:%M"),
        message.sender,
        message.content
    )
}

//! The interactive console loop behind `agrobot chat`.

use agrobot::{ChatProcessor, UserProfile};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

const PROMPT: &str = "Ask: ";
const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// Reads questions line by line and answers each until `exit`, `quit` or end of input.
///
/// Returns the number of questions answered.
pub async fn run_chat<R, W>(
    processor: &ChatProcessor,
    profile: &UserProfile,
    input: R,
    output: &mut W,
) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut answered = 0;
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if EXIT_WORDS.contains(&line.trim().to_lowercase().as_str()) {
            break;
        }

        let reply = processor.process_message(profile, &line).await;
        output.write_all(format!("Bot: {reply}\n").as_bytes()).await?;
        answered += 1;
    }
    debug!(answered, "Chat session ended");
    Ok(answered)
}

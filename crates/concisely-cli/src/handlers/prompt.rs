//! `concisely prompt`: render the summary prompt from stored messages.
//!
//! Useful for tuning the prompt against real conversations without
//! waiting for the bot to reach a summary interval.

use concisely_core::{ChatMessage, MessageRepository, full_prompt, transcript};

use crate::bootstrap::open_messages;
use crate::commands::PromptArgs;
use crate::config::Settings;
use crate::error::CliError;

pub async fn execute(settings: &Settings, args: &PromptArgs) -> Result<(), CliError> {
    let (pool, messages) = open_messages(settings).await?;
    let result = render(messages.as_ref(), args).await;
    pool.close().await;
    let prompt = result?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &prompt)?;
            eprintln!("Prompt written to {}", path.display());
        }
        None => println!("{prompt}"),
    }
    Ok(())
}

/// Load the selected messages and render them.
async fn render(messages: &dyn MessageRepository, args: &PromptArgs) -> Result<String, CliError> {
    let (selected, selection) = select(messages, args).await?;

    if selected.is_empty() {
        return Err(CliError::NoMessages {
            chat_id: args.chat_id,
            selection,
        });
    }
    eprintln!(
        "Found {} messages (chat_id={})",
        selected.len(),
        args.chat_id
    );

    Ok(if args.full {
        full_prompt(&selected)
    } else {
        transcript(&selected)
    })
}

async fn select(
    messages: &dyn MessageRepository,
    args: &PromptArgs,
) -> Result<(Vec<ChatMessage>, String), CliError> {
    if let Some((from, to)) = args.range() {
        let selected = messages.messages_in_range(args.chat_id, from, to).await?;
        Ok((selected, format!("from_id={from}, to_id={to}")))
    } else {
        let selected = messages.last_messages(args.chat_id, args.limit).await?;
        Ok((selected, format!("last {}", args.limit)))
    }
}

//! Subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Chat that `concisely prompt` reads when `--chat-id` is not given.
pub const DEFAULT_PROMPT_CHAT_ID: i64 = -1_001_829_561_306;

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the bot and poll Telegram until Ctrl-C
    Run,

    /// Print the summary prompt built from stored messages
    Prompt(PromptArgs),

    /// Check that external tools (ffmpeg) are installed
    CheckDeps,
}

#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Chat to read messages from
    #[arg(long, default_value_t = DEFAULT_PROMPT_CHAT_ID, allow_negative_numbers = true)]
    pub chat_id: i64,

    /// Start of the range (exclusive)
    #[arg(long, requires = "to_id")]
    pub from_id: Option<i64>,

    /// End of the range (inclusive)
    #[arg(long, requires = "from_id")]
    pub to_id: Option<i64>,

    /// Number of most recent messages, when no range is given
    #[arg(short = 'n', long, default_value_t = 100)]
    pub limit: u32,

    /// Write the prompt to a file instead of stdout
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Include the summarization instructions
    #[arg(long)]
    pub full: bool,
}

impl PromptArgs {
    /// The explicit `(from, to]` range, if both ends were given.
    pub const fn range(&self) -> Option<(i64, i64)> {
        match (self.from_id, self.to_id) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }
}

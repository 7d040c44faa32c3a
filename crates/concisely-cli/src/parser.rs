//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Telegram chat summarizer bot.
///
/// Without a subcommand, starts the bot.
#[derive(Parser, Debug)]
#[command(name = "concisely")]
#[command(about = "Record Telegram group chats and post periodic LLM summaries")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command to run; `run` when none was given.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

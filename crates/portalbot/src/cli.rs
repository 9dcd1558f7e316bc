use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portalbot")]
#[command(author, version, about = "Telegram bot that links a public channel to a private group", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default)
    Run,

    /// Print the portals created by a user as JSON
    ListPortals {
        /// Telegram user id of the portal owner
        #[arg(long)]
        owner: i64,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

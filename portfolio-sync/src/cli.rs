use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

/// Copies brokerage positions linked through SnapTrade into a Google Sheets tab.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// YAML file with non-secret settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Clone, Copy)]
pub enum Command {
    /// Registers the user and prints its secret (one-time)
    #[command(name = "registerUser")]
    RegisterUser,

    /// Prints the URL of the portal linking a brokerage account (one-time)
    #[command(name = "openPortal")]
    OpenPortal,

    /// Prints the accounts linked to the user
    #[command(name = "listAccounts")]
    ListAccounts,

    /// Writes the current positions into the spreadsheet (default)
    Sync {
        /// Reads the written rows back and fails if any cell differs
        #[arg(long)]
        verify: bool,
    },
}

impl Cli {
    pub fn operation(&self) -> Command {
        self.command.unwrap_or(Command::Sync { verify: false })
    }
}

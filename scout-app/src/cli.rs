use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use scout_telegram::PeerKind;

/// Search the channels of a Telegram folder for products from the backend.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch products and search the configured folder for the selected one (default)
    Run,
    /// Search a folder's channels for a literal query, without the backend
    Search {
        /// Folder ID (defaults to SCOUT_FOLDER_ID)
        #[arg(long)]
        folder: Option<i32>,
        query:  String,
    },
    /// List and classify dialogs
    Dialogs {
        #[arg(long, value_enum, default_value_t = KindFilter::All)]
        kind:    KindFilter,
        /// Fetch metadata for every channel and group
        #[arg(long)]
        details: bool,
    },
    /// Count channels, groups, private chats and folders
    Analyze,
    /// Find channels and groups by title or username
    Find { name: String },
    /// Show details of one channel
    Channel {
        id:          i64,
        #[arg(allow_negative_numbers = true)]
        access_hash: i64,
    },
    /// Manage folders
    #[command(subcommand)]
    Folders(FoldersCommand),
    /// List backend products
    Products,
    /// List backend search sessions
    Sessions,
}

#[derive(Debug, Subcommand)]
pub enum FoldersCommand {
    /// One line per folder
    List,
    /// Details of one folder
    Show { id: i32 },
    /// Telegram's folder suggestions
    Suggested,
    /// Print every folder's configuration, optionally writing it as JSON
    Backup {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Create an empty folder with the next free ID
    Create {
        title: String,
        #[arg(long)]
        emoji: Option<String>,
    },
    /// Delete a folder
    Delete { id: i32 },
    /// Set the folder order
    Reorder {
        #[arg(required = true)]
        ids: Vec<i32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    All,
    Channels,
    Supergroups,
    Groups,
}

impl KindFilter {
    pub fn kinds(self) -> &'static [PeerKind] {
        match self {
            Self::All         => &[PeerKind::Channel, PeerKind::Supergroup, PeerKind::Group, PeerKind::Private],
            Self::Channels    => &[PeerKind::Channel],
            Self::Supergroups => &[PeerKind::Supergroup],
            Self::Groups      => &[PeerKind::Group],
        }
    }
}

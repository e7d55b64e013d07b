use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "airlog",
    version,
    about = "Track watched episodes of airing shows and when the next one is out"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the episode table.
    List {
        /// Show every episode instead of only unwatched ones.
        #[arg(long)]
        all: bool,
    },
    /// Print the tracked shows themselves.
    Shows,
    /// Track a new show.
    Add(ShowFields),
    /// Change fields of a tracked show.
    Edit {
        key: String,
        #[command(flatten)]
        fields: ShowFields,
    },
    /// Mark an episode as watched.
    Watch { key: String, episode: i64 },
    /// Mark an episode as not watched.
    Unwatch { key: String, episode: i64 },
    /// Stop tracking a show.
    Delete {
        key: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    Tui,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ShowFields {
    #[arg(long)]
    pub name: Option<String>,
    /// Release date of the first episode (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<String>,
    /// Number of the first tracked episode.
    #[arg(long, allow_hyphen_values = true)]
    pub first: Option<String>,
    /// Days between releases.
    #[arg(long)]
    pub interval: Option<String>,
}

//! CLI command definitions and subcommands

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use recipestore::{KeyValueStore, RecipeBook, RecipeId, SortOrder, TimeBucket};
use tracing::debug;

/// RecipeBox - terminal recipe manager
#[derive(Parser, Debug)]
#[command(
    name = "rb",
    author,
    version,
    about = "Terminal recipe manager with search, filters, favorites and pagination"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute; opens the TUI when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive recipe manager (default)
    Tui,

    /// List recipes through the same sort/filter/page pipeline as the TUI
    List {
        /// Sort by preparation time (asc, desc)
        #[arg(short, long, default_value = "asc")]
        sort: SortOrder,

        /// Time bucket (all, under30, 30to60, over60)
        #[arg(short, long, default_value = "all")]
        bucket: TimeBucket,

        /// Case-insensitive search on title or ingredients
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Only favorites
        #[arg(short, long)]
        favorites: bool,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Recipes per page (defaults to config page-size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Output format
        #[arg(short = 'o', long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one recipe in full
    Show {
        /// Recipe ID
        id: String,
    },

    /// Add a recipe
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short = 'g', long)]
        ingredients: String,

        #[arg(short = 'n', long)]
        instructions: String,

        /// Preparation time in minutes
        #[arg(short = 'm', long)]
        minutes: u32,

        /// Image file, stored as a data URI
        #[arg(short, long)]
        image: PathBuf,

        /// Mark as favorite
        #[arg(short, long)]
        favorite: bool,
    },

    /// Edit a recipe; omitted fields keep their current value
    Edit {
        /// Recipe ID
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short = 'g', long)]
        ingredients: Option<String>,

        #[arg(short = 'n', long)]
        instructions: Option<String>,

        /// Preparation time in minutes
        #[arg(short = 'm', long)]
        minutes: Option<u32>,

        /// Replacement image file
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Delete a recipe
    Delete {
        /// Recipe ID
        id: String,
    },

    /// Toggle a recipe's favorite flag
    Favorite {
        /// Recipe ID
        id: String,
    },

    /// Print the storage and log locations
    Path,
}

/// Output format for list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

/// Resolve a full id or a unique short id (id suffix), as printed by `list`
pub fn resolve_id<S: KeyValueStore>(book: &RecipeBook<S>, arg: &str) -> Result<RecipeId> {
    debug!(%arg, "resolve_id: called");
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(eyre::eyre!("Recipe ID must not be empty"));
    }
    let id = RecipeId::from_string(arg);
    if book.get(&id).is_some() {
        return Ok(id);
    }

    let mut matches = book.recipes().iter().filter(|r| r.id.as_str().ends_with(arg));
    match (matches.next(), matches.next()) {
        (Some(recipe), None) => Ok(recipe.id.clone()),
        (Some(_), Some(_)) => Err(eyre::eyre!("Recipe ID '{}' is ambiguous", arg)),
        (None, _) => Err(eyre::eyre!("Recipe not found: {}", arg)),
    }
}

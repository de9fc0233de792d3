//! Terminal User Interface for RecipeBox
//!
//! Browse recipes as cards, three to a page, with:
//! - Sort and time filters, favorites-only view
//! - Debounced search over titles and ingredients (/)
//! - A modal form for creating and editing recipes

mod app;
mod debounce;
mod events;
mod runner;
pub mod state;
mod views;

pub use app::{Action, App};
pub use debounce::Debouncer;
pub use events::{Event, EventHandler};
pub use runner::TuiRunner;
pub use state::{AppState, InteractionMode, NoticeLevel};

use std::io::{self, Stdout};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use recipestore::{KeyValueStore, OpenNotice, RecipeBook};

use crate::config::Config;

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Run the TUI over an opened book
pub async fn run<S: KeyValueStore>(book: RecipeBook<S>, notice: Option<OpenNotice>, config: &Config) -> Result<()> {
    let mut app = App::new(book, config.page_size, config.search_debounce());
    if let Some(notice) = notice {
        app.state_mut().notify(NoticeLevel::Error, notice.to_string());
    }

    let terminal = init()?;

    // Use a guard to ensure terminal is restored even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let mut runner = TuiRunner::new(terminal, app, config.max_image_bytes);
    runner.run().await
}

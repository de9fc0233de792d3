//! TUI Runner - main loop that owns the terminal
//!
//! The TuiRunner is responsible for:
//! - Rendering at ~30 FPS
//! - Dispatching events to App for handling
//! - Running image loads in the background and feeding results back

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eyre::Result;
use recipestore::KeyValueStore;
use tracing::{debug, trace};

use super::Tui;
use super::app::{Action, App};
use super::events::{Event, EventHandler};
use super::views;
use crate::image;

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner<S> {
    app: App<S>,
    terminal: Tui,
    event_handler: EventHandler,
    /// Size limit for images picked in the form
    max_image_bytes: u64,
}

impl<S: KeyValueStore> TuiRunner<S> {
    pub fn new(terminal: Tui, app: App<S>, max_image_bytes: u64) -> Self {
        debug!(max_image_bytes, "TuiRunner::new: called");
        Self {
            app,
            terminal,
            event_handler: EventHandler::new(Duration::from_millis(33)), // ~30 FPS
            max_image_bytes,
        }
    }

    /// Run the TUI main loop
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        loop {
            self.terminal.draw(|frame| views::render(self.app.state(), frame))?;

            match self.event_handler.next().await? {
                Event::Tick => self.app.tick(Instant::now()),
                Event::Key(key) => {
                    if let Some(action) = self.app.handle_key(key, Instant::now()) {
                        match action {
                            Action::Quit => break,
                            Action::LoadImage { generation, path } => self.spawn_image_load(generation, path),
                        }
                    }
                }
                Event::Resize(width, height) => {
                    trace!(width, height, "TuiRunner::run: resize");
                }
                Event::ImageLoaded { generation, result } => self.app.image_loaded(generation, result),
            }

            if self.app.state().should_quit {
                debug!("TuiRunner::run: should_quit is true, breaking");
                break;
            }
        }

        debug!("TuiRunner::run: exiting");
        Ok(())
    }

    /// Read the image off the UI task; the result comes back as an event
    fn spawn_image_load(&self, generation: u64, path: PathBuf) {
        debug!(generation, ?path, "TuiRunner::spawn_image_load: called");
        let tx = self.event_handler.sender();
        let max_bytes = self.max_image_bytes;
        tokio::spawn(async move {
            let result = image::load_data_uri(&path, max_bytes)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Event::ImageLoaded { generation, result });
        });
    }
}

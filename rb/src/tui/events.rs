//! TUI event handling
//!
//! Terminal input, ticks and finished background work all arrive on one
//! tokio channel, so the runner handles them in order on a single task.

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind};
use eyre::Result;
use tokio::sync::mpsc;
use tracing::debug;

/// Events consumed by the runner
#[derive(Debug)]
pub enum Event {
    /// Key press
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick (drives debounce and notice expiry)
    Tick,
    /// An image load finished
    ImageLoaded {
        generation: u64,
        result: Result<String, String>,
    },
}

/// Event handler for the TUI
pub struct EventHandler {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        debug!(?tick_rate, "EventHandler::new: called");
        let (tx, rx) = mpsc::unbounded_channel();
        let input_tx = tx.clone();

        // Crossterm polling blocks, so it gets its own thread
        std::thread::spawn(move || {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(event::Event::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
                        Ok(event::Event::Resize(w, h)) => Event::Resize(w, h),
                        _ => continue,
                    }
                } else {
                    Event::Tick
                };

                if input_tx.send(event).is_err() {
                    debug!("EventHandler: channel closed, exiting input thread");
                    break;
                }
            }
        });

        Self { tx, rx }
    }

    /// Sender for background tasks to report back on
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Get the next event (async)
    pub async fn next(&mut self) -> Result<Event> {
        self.rx.recv().await.ok_or_else(|| eyre::eyre!("Event channel closed"))
    }
}

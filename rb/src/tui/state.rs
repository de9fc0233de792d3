//! TUI application state
//!
//! Pure data structures for the TUI. No rendering logic and no storage here.

use std::time::{Duration, Instant};

use recipestore::{Field, PageView, Query, Recipe, RecipeForm, RecipeId};
use tracing::debug;

/// How long a notice stays in the footer
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Interaction mode (modal)
#[derive(Debug, Clone, Default)]
pub enum InteractionMode {
    /// Browsing the recipe page
    #[default]
    Normal,
    /// Typing into the search box (/ key)
    Search,
    /// Create/edit modal
    Form(FormState),
    /// Confirmation dialog
    Confirm(ConfirmDialog),
    /// Help overlay
    Help,
}

/// Cursor state of the create/edit modal
///
/// The values themselves live in [`AppState::form`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    /// Field receiving keystrokes
    pub focus: Field,
    /// Path typed into the image field, loaded on Enter
    pub image_path: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            focus: Field::Title,
            image_path: String::new(),
        }
    }
}

/// Next field in form order, wrapping
pub fn next_field(field: Field) -> Field {
    let idx = Field::ALL.iter().position(|f| *f == field).unwrap_or(0);
    Field::ALL[(idx + 1) % Field::ALL.len()]
}

/// Previous field in form order, wrapping
pub fn prev_field(field: Field) -> Field {
    let idx = Field::ALL.iter().position(|f| *f == field).unwrap_or(0);
    Field::ALL[(idx + Field::ALL.len() - 1) % Field::ALL.len()]
}

/// Confirmation dialog
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    /// Message to display
    pub message: String,
    /// Action to perform on confirm
    pub action: PendingAction,
}

/// Actions that require confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Delete(RecipeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient footer message
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub shown_at: Instant,
}

/// Complete TUI state
#[derive(Debug)]
pub struct AppState {
    /// Applied query; `query.search` is the debounced search text
    pub query: Query,
    /// Search text as typed, ahead of `query.search` while debouncing
    pub search_input: String,
    /// Current pipeline output
    pub page: PageView,
    /// Selected card within `page.items`
    pub selected: usize,
    /// Size of the whole collection
    pub total_recipes: usize,
    /// Favorites in the whole collection
    pub total_favorites: usize,
    /// Values of the create/edit form
    pub form: RecipeForm,
    /// An image load is in flight for the form
    pub image_loading: bool,
    pub interaction_mode: InteractionMode,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        debug!(page_size, "AppState::new: called");
        Self {
            query: Query {
                page_size,
                ..Default::default()
            },
            search_input: String::new(),
            page: PageView {
                items: Vec::new(),
                page: 1,
                page_count: 0,
                total_matches: 0,
            },
            selected: 0,
            total_recipes: 0,
            total_favorites: 0,
            form: RecipeForm::new(),
            image_loading: false,
            interaction_mode: InteractionMode::Normal,
            notice: None,
            should_quit: false,
        }
    }

    /// Recipe under the cursor
    pub fn selected_recipe(&self) -> Option<&Recipe> {
        self.page.items.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.page.items.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Install a fresh pipeline result, keeping the cursor in range
    pub fn set_page(&mut self, page: PageView) {
        self.query.page = page.page;
        self.selected = self.selected.min(page.items.len().saturating_sub(1));
        self.page = page;
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        let text = text.into();
        debug!(?level, %text, "AppState::notify: called");
        self.notice = Some(Notice {
            level,
            text,
            shown_at: Instant::now(),
        });
    }

    /// Drop the notice once it has been visible long enough
    pub fn expire_notice(&mut self, now: Instant) {
        if let Some(notice) = &self.notice
            && now.saturating_duration_since(notice.shown_at) >= NOTICE_TTL
        {
            self.notice = None;
        }
    }

    pub fn is_form_open(&self) -> bool {
        matches!(self.interaction_mode, InteractionMode::Form(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_cycle() {
        assert_eq!(next_field(Field::PreparationTime), Field::Image);
        assert_eq!(prev_field(Field::Image), Field::PreparationTime);
        let mut field = Field::Title;
        for _ in 0..Field::ALL.len() {
            field = next_field(field);
        }
        assert_eq!(field, Field::Title);
    }

    #[test]
    fn test_selection_stays_in_page() {
        let mut state = AppState::new(3);
        state.select_next();
        assert_eq!(state.selected, 0);
        state.select_prev();
        assert_eq!(state.selected, 0);
        assert!(state.selected_recipe().is_none());
    }

    #[test]
    fn test_notice_expires() {
        let mut state = AppState::new(3);
        state.notify(NoticeLevel::Info, "hello");
        let shown = state.notice.as_ref().unwrap().shown_at;

        state.expire_notice(shown + Duration::from_secs(1));
        assert!(state.notice.is_some());
        state.expire_notice(shown + NOTICE_TTL);
        assert!(state.notice.is_none());
    }
}

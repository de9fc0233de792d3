//! TUI application logic
//!
//! Handles key events and state transitions. Mutations go straight to the
//! [`RecipeBook`] and persist before the handler returns; the page is then
//! recomputed from the book.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use recipestore::{BookError, Field, KeyValueStore, RecipeBook, RecipeId};
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::state::{AppState, ConfirmDialog, FormState, InteractionMode, NoticeLevel, PendingAction, next_field, prev_field};
use crate::image::ImageLoads;

/// Work the runner has to do on the app's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Read an image file for the open form
    LoadImage { generation: u64, path: PathBuf },
}

/// What a key press in the form asked for
enum FormIntent {
    None,
    Submit,
    Cancel,
    LoadImage(String),
}

/// Main application, generic over where recipes are stored
pub struct App<S> {
    book: RecipeBook<S>,
    state: AppState,
    search: Debouncer<String>,
    images: ImageLoads,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(book: RecipeBook<S>, page_size: usize, search_debounce: Duration) -> Self {
        debug!(page_size, ?search_debounce, "App::new: called");
        let mut app = Self {
            book,
            state: AppState::new(page_size),
            search: Debouncer::new(search_debounce),
            images: ImageLoads::new(),
        };
        app.refresh();
        app
    }

    /// Get the current state (for rendering)
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get mutable state
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn book(&self) -> &RecipeBook<S> {
        &self.book
    }

    /// Recompute the visible page from the collection
    pub fn refresh(&mut self) {
        let page = self.book.query(&self.state.query);
        self.state.total_recipes = self.book.len();
        self.state.total_favorites = self.book.recipes().iter().filter(|r| r.favorite).count();
        self.state.set_page(page);
    }

    /// Periodic tick: apply debounced search and expire notices
    pub fn tick(&mut self, now: Instant) {
        if let Some(search) = self.search.poll(now) {
            self.apply_search(search);
        }
        self.state.expire_notice(now);
    }

    fn apply_search(&mut self, search: String) {
        if search == self.state.query.search {
            return;
        }
        debug!(%search, "App::apply_search: applying");
        self.state.query.search = search;
        self.state.query.page = 1;
        self.state.selected = 0;
        self.refresh();
    }

    /// Handle a key event; returns an action for the runner, if any
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Action> {
        debug!(?key, mode = ?self.state.interaction_mode, "App::handle_key: called");
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.state.should_quit = true;
            return Some(Action::Quit);
        }

        match self.state.interaction_mode {
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::Search => {
                self.handle_search_key(key, now);
                None
            }
            InteractionMode::Form(_) => self.handle_form_key(key),
            InteractionMode::Confirm(_) => {
                self.handle_confirm_key(key);
                None
            }
            InteractionMode::Help => {
                self.state.interaction_mode = InteractionMode::Normal;
                None
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => {
                self.state.should_quit = true;
                return Some(Action::Quit);
            }
            KeyCode::Char('?') | KeyCode::F(1) => self.state.interaction_mode = InteractionMode::Help,
            KeyCode::Up | KeyCode::Char('k') => self.state.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => self.state.select_next(),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => self.go_to_page(self.state.page.page + 1),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => {
                self.go_to_page(self.state.page.page.saturating_sub(1))
            }
            KeyCode::Char(c @ '1'..='9') => self.go_to_page(c as usize - '0' as usize),
            KeyCode::Char('a') => self.open_create_form(),
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit_form(),
            KeyCode::Char('d') => self.confirm_delete(),
            KeyCode::Char('f') => self.toggle_favorite(),
            KeyCode::Char('F') => {
                self.state.query.favorites_only = !self.state.query.favorites_only;
                self.reset_to_first_page();
            }
            KeyCode::Char('t') => {
                self.state.query.bucket = self.state.query.bucket.next();
                self.reset_to_first_page();
            }
            KeyCode::Char('s') => {
                self.state.query.sort = self.state.query.sort.toggle();
                self.refresh();
            }
            KeyCode::Char('/') => self.state.interaction_mode = InteractionMode::Search,
            KeyCode::Esc => {
                if self.state.notice.is_some() {
                    self.state.notice = None;
                } else if !self.state.search_input.is_empty() || !self.state.query.search.is_empty() {
                    self.state.search_input.clear();
                    self.search.cancel();
                    self.apply_search(String::new());
                }
            }
            _ => {}
        }
        None
    }

    fn go_to_page(&mut self, page: usize) {
        if page >= 1 && page <= self.state.page.page_count && page != self.state.page.page {
            debug!(page, "App::go_to_page: changing page");
            self.state.query.page = page;
            self.state.selected = 0;
            self.refresh();
        }
    }

    fn reset_to_first_page(&mut self) {
        self.state.query.page = 1;
        self.state.selected = 0;
        self.refresh();
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Enter => {
                self.state.interaction_mode = InteractionMode::Normal;
                if let Some(search) = self.search.flush() {
                    self.apply_search(search);
                }
            }
            KeyCode::Esc => self.state.interaction_mode = InteractionMode::Normal,
            KeyCode::Backspace => {
                self.state.search_input.pop();
                self.search.push(self.state.search_input.clone(), now);
            }
            KeyCode::Char(c) => {
                self.state.search_input.push(c);
                self.search.push(self.state.search_input.clone(), now);
            }
            _ => {}
        }
    }

    fn open_create_form(&mut self) {
        debug!("App::open_create_form: called");
        self.state.form.reset();
        self.state.interaction_mode = InteractionMode::Form(FormState::default());
    }

    fn open_edit_form(&mut self) {
        let Some(id) = self.state.selected_recipe().map(|r| r.id.clone()) else {
            return;
        };
        debug!(%id, "App::open_edit_form: called");
        match self.state.form.begin_edit(&self.book, &id) {
            Ok(()) => self.state.interaction_mode = InteractionMode::Form(FormState::default()),
            Err(e) => self.state.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    fn close_form(&mut self) {
        self.state.form.reset();
        self.images.cancel();
        self.state.image_loading = false;
        self.state.interaction_mode = InteractionMode::Normal;
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let intent = {
            let InteractionMode::Form(form_state) = &mut self.state.interaction_mode else {
                return None;
            };
            let draft = self.state.form.draft_mut();
            let focus = form_state.focus;
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

            match key.code {
                KeyCode::Esc => FormIntent::Cancel,
                KeyCode::Char('s') if ctrl => FormIntent::Submit,
                KeyCode::Tab | KeyCode::Down => {
                    form_state.focus = next_field(focus);
                    FormIntent::None
                }
                KeyCode::BackTab | KeyCode::Up => {
                    form_state.focus = prev_field(focus);
                    FormIntent::None
                }
                KeyCode::Enter => match focus {
                    Field::Image => FormIntent::LoadImage(form_state.image_path.trim().to_string()),
                    Field::PreparationTime => FormIntent::Submit,
                    _ => {
                        form_state.focus = next_field(focus);
                        FormIntent::None
                    }
                },
                KeyCode::Backspace => {
                    match focus {
                        Field::Image => {
                            form_state.image_path.pop();
                        }
                        Field::Title => {
                            draft.title.pop();
                        }
                        Field::Ingredients => {
                            draft.ingredients.pop();
                        }
                        Field::Instructions => {
                            draft.instructions.pop();
                        }
                        Field::PreparationTime => draft.preparation_time /= 10,
                    }
                    FormIntent::None
                }
                KeyCode::Char(c) if !ctrl => {
                    match focus {
                        Field::Image => form_state.image_path.push(c),
                        Field::Title => draft.title.push(c),
                        Field::Ingredients => draft.ingredients.push(c),
                        Field::Instructions => draft.instructions.push(c),
                        Field::PreparationTime => {
                            if let Some(digit) = c.to_digit(10) {
                                draft.preparation_time = draft
                                    .preparation_time
                                    .checked_mul(10)
                                    .and_then(|t| t.checked_add(digit))
                                    .unwrap_or(draft.preparation_time);
                            }
                        }
                    }
                    FormIntent::None
                }
                _ => FormIntent::None,
            }
        };

        match intent {
            FormIntent::None => None,
            FormIntent::Cancel => {
                self.close_form();
                None
            }
            FormIntent::Submit => {
                self.submit_form();
                None
            }
            FormIntent::LoadImage(path) => {
                if path.is_empty() {
                    self.state.notify(NoticeLevel::Error, "Type an image path, then press Enter");
                    return None;
                }
                let generation = self.images.begin();
                self.state.image_loading = true;
                Some(Action::LoadImage {
                    generation,
                    path: PathBuf::from(path),
                })
            }
        }
    }

    fn submit_form(&mut self) {
        debug!(mode = ?self.state.form.mode(), "App::submit_form: called");
        if self.images.is_pending() {
            self.state.notify(NoticeLevel::Info, "Image is still loading");
            return;
        }
        match self.state.form.submit(&mut self.book) {
            Ok(saved) => {
                info!(id = %saved.id(), "App::submit_form: saved");
                self.close_form();
                self.refresh();
                self.state.notify(NoticeLevel::Success, saved.to_string());
            }
            Err(BookError::NotFound(id)) => {
                warn!(%id, "App::submit_form: edited recipe no longer exists");
                self.close_form();
                self.refresh();
                self.state.notify(NoticeLevel::Error, format!("Recipe not found: {}", id.short()));
            }
            Err(e) => self.state.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    /// Result of a finished image load
    pub fn image_loaded(&mut self, generation: u64, result: Result<String, String>) {
        if !self.images.complete(generation) || !self.state.is_form_open() {
            debug!(generation, "App::image_loaded: superseded, dropping");
            return;
        }
        self.state.image_loading = false;
        match result {
            Ok(uri) => {
                self.state.form.draft_mut().image = Some(uri);
                if let InteractionMode::Form(form_state) = &mut self.state.interaction_mode {
                    form_state.image_path.clear();
                    form_state.focus = Field::Title;
                }
                self.state.notify(NoticeLevel::Success, "Image loaded");
            }
            Err(e) => self.state.notify(NoticeLevel::Error, e),
        }
    }

    fn confirm_delete(&mut self) {
        let Some(recipe) = self.state.selected_recipe() else {
            return;
        };
        let dialog = ConfirmDialog {
            message: format!("Delete '{}'?", recipe.title),
            action: PendingAction::Delete(recipe.id.clone()),
        };
        self.state.interaction_mode = InteractionMode::Confirm(dialog);
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let mode = std::mem::take(&mut self.state.interaction_mode);
                if let InteractionMode::Confirm(dialog) = mode {
                    match dialog.action {
                        PendingAction::Delete(id) => self.delete(&id),
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => self.state.interaction_mode = InteractionMode::Normal,
            _ => {}
        }
    }

    fn delete(&mut self, id: &RecipeId) {
        match self.book.delete(id) {
            Ok(removed) => {
                self.refresh();
                self.state
                    .notify(NoticeLevel::Success, format!("Recipe '{}' deleted", removed.title));
            }
            Err(e) => self.state.notify(NoticeLevel::Error, e.to_string()),
        }
    }

    fn toggle_favorite(&mut self) {
        let Some(id) = self.state.selected_recipe().map(|r| r.id.clone()) else {
            return;
        };
        match self.book.toggle_favorite(&id) {
            Ok(_) => self.refresh(),
            Err(e) => self.state.notify(NoticeLevel::Error, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipestore::{MemoryStore, RecipeDraft, SortOrder, TimeBucket};

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn draft(title: &str, ingredients: &str, minutes: u32) -> RecipeDraft {
        RecipeDraft {
            image: Some("data:image/png;base64,AAAA".to_string()),
            title: title.to_string(),
            ingredients: ingredients.to_string(),
            instructions: "cook".to_string(),
            preparation_time: minutes,
            favorite: false,
        }
    }

    fn app_with(recipes: &[(&str, &str, u32)]) -> App<MemoryStore> {
        let (mut book, _) = RecipeBook::open(MemoryStore::new(), "recipes").unwrap();
        for (title, ingredients, minutes) in recipes {
            book.add(draft(title, ingredients, *minutes)).unwrap();
        }
        App::new(book, 3, DEBOUNCE)
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode) -> Option<Action> {
        app.handle_key(KeyEvent::from(code), Instant::now())
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn titles(app: &App<MemoryStore>) -> Vec<String> {
        app.state().page.items.iter().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(&[]);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Some(Action::Quit));

        let mut app = app_with(&[]);
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(key, Instant::now()), Some(Action::Quit));
        assert!(app.state().should_quit);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Help));
        press(&mut app, KeyCode::Char('x'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
    }

    #[test]
    fn test_pagination_keys() {
        let mut app = app_with(&[
            ("a", "x", 1),
            ("b", "x", 2),
            ("c", "x", 3),
            ("d", "x", 4),
            ("e", "x", 5),
            ("f", "x", 6),
            ("g", "x", 7),
        ]);
        assert_eq!(app.state().page.page_count, 3);
        assert_eq!(titles(&app), vec!["a", "b", "c"]);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(titles(&app), vec!["d", "e", "f"]);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(titles(&app), vec!["g"]);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.state().page.page, 3);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.state().page.page, 3);
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.state().page.page, 2);
    }

    #[test]
    fn test_sort_and_bucket_keys() {
        let mut app = app_with(&[("slow", "x", 90), ("quick", "x", 10), ("mid", "x", 45)]);
        assert_eq!(titles(&app), vec!["quick", "mid", "slow"]);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.state().query.sort, SortOrder::Descending);
        assert_eq!(titles(&app), vec!["slow", "mid", "quick"]);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.state().query.bucket, TimeBucket::Under30);
        assert_eq!(titles(&app), vec!["quick"]);
    }

    #[test]
    fn test_search_is_debounced() {
        let mut app = app_with(&[("Crepes", "2 Eggs, flour", 20), ("Soup", "water", 30)]);
        let start = Instant::now();

        app.handle_key(KeyEvent::from(KeyCode::Char('/')), start);
        for c in "egg".chars() {
            app.handle_key(KeyEvent::from(KeyCode::Char(c)), start);
        }
        assert_eq!(app.state().search_input, "egg");
        assert_eq!(titles(&app).len(), 2);

        app.tick(start + Duration::from_millis(100));
        assert_eq!(titles(&app).len(), 2);

        app.tick(start + DEBOUNCE);
        assert_eq!(app.state().query.search, "egg");
        assert_eq!(titles(&app), vec!["Crepes"]);
    }

    #[test]
    fn test_search_enter_applies_immediately() {
        let mut app = app_with(&[("Crepes", "2 Eggs, flour", 20), ("Soup", "water", 30)]);
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "soup");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.state().interaction_mode, InteractionMode::Normal));
        assert_eq!(titles(&app), vec!["Soup"]);

        press(&mut app, KeyCode::Esc);
        assert_eq!(titles(&app).len(), 2);
    }

    #[test]
    fn test_favorite_toggle_and_filter() {
        let mut app = app_with(&[("a", "x", 1), ("b", "x", 2)]);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.state().total_favorites, 1);

        press(&mut app, KeyCode::Char('F'));
        assert_eq!(titles(&app), vec!["b"]);

        press(&mut app, KeyCode::Char('f'));
        assert!(app.state().page.is_empty());
        assert_eq!(app.book().recipes().iter().filter(|r| r.favorite).count(), 0);
    }

    #[test]
    fn test_delete_targets_card_on_filtered_page() {
        let mut app = app_with(&[("Roast", "beef", 120), ("Salad", "lettuce", 10), ("Toast", "bread", 5)]);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(titles(&app), vec!["Toast", "Salad"]);

        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.state().interaction_mode, InteractionMode::Confirm(_)));
        press(&mut app, KeyCode::Char('y'));

        let left: Vec<_> = app.book().recipes().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(left, vec!["Roast", "Salad"]);
        assert_eq!(titles(&app), vec!["Salad"]);
    }

    #[test]
    fn test_delete_cancel() {
        let mut app = app_with(&[("a", "x", 1)]);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.book().len(), 1);
    }

    #[test]
    fn test_create_via_form() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        assert!(app.state().is_form_open());

        type_text(&mut app, "Pancakes");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "eggs, flour");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "mix and fry");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2x5");
        assert_eq!(app.state().form.draft().preparation_time, 25);

        // no image yet
        press(&mut app, KeyCode::Enter);
        assert!(app.state().is_form_open());
        assert!(app.book().is_empty());
        assert_eq!(app.state().notice.as_ref().map(|n| n.level), Some(NoticeLevel::Error));

        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "/tmp/cake.png");
        let action = press(&mut app, KeyCode::Enter);
        let Some(Action::LoadImage { generation, path }) = action else {
            panic!("expected image load, got {:?}", action);
        };
        assert_eq!(path, PathBuf::from("/tmp/cake.png"));
        app.image_loaded(generation, Ok("data:image/png;base64,AAAA".to_string()));

        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        app.handle_key(save, Instant::now());
        assert!(!app.state().is_form_open());
        assert_eq!(app.book().len(), 1);
        assert_eq!(titles(&app), vec!["Pancakes"]);
        assert_eq!(app.state().form.draft(), &RecipeDraft::default());
    }

    #[test]
    fn test_stale_image_is_ignored() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::BackTab);
        type_text(&mut app, "old.png");
        let Some(Action::LoadImage { generation: old, .. }) = press(&mut app, KeyCode::Enter) else {
            panic!("expected image load");
        };
        type_text(&mut app, "x");
        let Some(Action::LoadImage { generation: new, .. }) = press(&mut app, KeyCode::Enter) else {
            panic!("expected image load");
        };

        app.image_loaded(new, Ok("data:image/png;base64,NEW".to_string()));
        app.image_loaded(old, Ok("data:image/png;base64,OLD".to_string()));
        assert_eq!(
            app.state().form.draft().image.as_deref(),
            Some("data:image/png;base64,NEW")
        );
    }

    #[test]
    fn test_image_after_cancel_is_ignored() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::BackTab);
        type_text(&mut app, "cake.png");
        let Some(Action::LoadImage { generation, .. }) = press(&mut app, KeyCode::Enter) else {
            panic!("expected image load");
        };
        press(&mut app, KeyCode::Esc);

        app.image_loaded(generation, Ok("data:image/png;base64,AAAA".to_string()));
        assert!(!app.state().is_form_open());
        assert_eq!(app.state().form.draft().image, None);
    }

    #[test]
    fn test_edit_via_form_keeps_length() {
        let mut app = app_with(&[("Soup", "water", 30), ("Stew", "beef", 90)]);
        press(&mut app, KeyCode::Char('e'));
        assert!(app.state().form.is_editing());
        assert_eq!(app.state().form.draft().title, "Soup");

        type_text(&mut app, "!");
        let save = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        app.handle_key(save, Instant::now());

        assert_eq!(app.book().len(), 2);
        assert_eq!(app.book().recipes()[0].title, "Soup!");
        assert!(!app.state().form.is_editing());
    }
}

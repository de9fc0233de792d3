//! TUI views and rendering
//!
//! Drawing only. Views read [`AppState`] and never modify it.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use recipestore::{Field, Recipe, TimeBucket};
use tracing::trace;

use super::state::{AppState, ConfirmDialog, FormState, InteractionMode, NoticeLevel};
use crate::image::describe_data_uri;

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const FAVORITE: Color = Color::Rgb(255, 215, 0); // Gold
    pub const SUCCESS: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const SELECTED_BORDER: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const FOCUS_BG: Color = Color::Rgb(40, 40, 40);
    pub const DIM: Color = Color::DarkGray;
}

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame) {
    trace!(mode = ?state.interaction_mode, "render: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Cards
            Constraint::Length(1), // Pagination
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);
    render_cards(state, frame, chunks[1]);
    render_pagination(state, frame, chunks[2]);
    render_footer(state, frame, chunks[3]);

    match &state.interaction_mode {
        InteractionMode::Help => render_help_overlay(frame, frame.area()),
        InteractionMode::Confirm(dialog) => render_confirm_dialog(dialog, frame, frame.area()),
        InteractionMode::Form(form_state) => render_form(state, form_state, frame, frame.area()),
        _ => {}
    }
}

/// Header with collection counts and the active query
fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    let query = &state.query;
    let mut spans = vec![
        Span::styled(
            " RecipeBox",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::raw(format!("{} recipes", state.total_recipes)),
        Span::raw(" · "),
        Span::styled(
            format!("{} ★", state.total_favorites),
            Style::default().fg(colors::FAVORITE),
        ),
        Span::raw(" │ "),
        Span::raw(query.sort.to_string()),
    ];

    if query.bucket != TimeBucket::All {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(query.bucket.to_string(), Style::default().fg(colors::KEYBIND)));
    }
    if query.favorites_only {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled("★ only", Style::default().fg(colors::FAVORITE)));
    }
    if !query.search.is_empty() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("/{}", query.search),
            Style::default().fg(colors::KEYBIND),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

/// One bordered card per recipe on the current page
fn render_cards(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!(items = state.page.items.len(), "render_cards: called");
    if state.page.is_empty() {
        let text = if state.total_recipes == 0 {
            "No recipes yet. Press 'a' to add one."
        } else {
            "No recipes match the current filters."
        };
        let empty = Paragraph::new(Line::from(Span::styled(text, Style::default().fg(colors::DIM))))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let slots = state.query.page_size.max(state.page.items.len()) as u32;
    let constraints: Vec<Constraint> = (0..slots).map(|_| Constraint::Ratio(1, slots)).collect();
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (idx, recipe) in state.page.items.iter().enumerate() {
        render_card(recipe, idx == state.selected, frame, areas[idx]);
    }
}

fn render_card(recipe: &Recipe, selected: bool, frame: &mut Frame, area: Rect) {
    let mut title = vec![Span::raw(" ")];
    if recipe.favorite {
        title.push(Span::styled("★ ", Style::default().fg(colors::FAVORITE)));
    }
    title.push(Span::styled(
        recipe.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    title.push(Span::styled(
        format!(" · {} min ", recipe.preparation_time),
        Style::default().fg(colors::DIM),
    ));

    let border = if selected {
        Style::default().fg(colors::SELECTED_BORDER)
    } else {
        Style::default().fg(colors::DIM)
    };

    let image = match &recipe.image {
        Some(uri) => describe_data_uri(uri),
        None => "no image".to_string(),
    };

    let body = vec![
        labeled("Ingredients", &recipe.ingredients),
        labeled("Instructions", &recipe.instructions),
        Line::from(vec![
            Span::styled(format!("{:<14}", "Image"), Style::default().fg(colors::DIM)),
            Span::styled(image, Style::default().fg(colors::DIM)),
        ]),
    ];

    let card = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(Line::from(title)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(card, area);
}

fn labeled<'a>(label: &'a str, value: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), Style::default().fg(colors::KEYBIND)),
        Span::raw(value),
    ])
}

/// Page numbers with the current one highlighted
fn render_pagination(state: &AppState, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for number in state.page.page_numbers() {
        let style = if number == state.page.page {
            Style::default()
                .fg(Color::Black)
                .bg(colors::KEYBIND)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::DIM)
        };
        spans.push(Span::styled(format!(" {} ", number), style));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        format!(
            " page {}/{} · {} matching",
            state.page.page,
            state.page.page_count.max(1),
            state.page.total_matches
        ),
        Style::default().fg(colors::DIM),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Footer: search input, the current notice, or key hints
fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!(mode = ?state.interaction_mode, "render_footer: called");
    let content = if matches!(state.interaction_mode, InteractionMode::Search) {
        Line::from(vec![
            Span::styled("/", Style::default().fg(colors::KEYBIND)),
            Span::raw(state.search_input.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            Span::styled("  (Enter to apply, Esc to close)", Style::default().fg(colors::DIM)),
        ])
    } else if let Some(notice) = &state.notice {
        let color = match notice.level {
            NoticeLevel::Info => colors::KEYBIND,
            NoticeLevel::Success => colors::SUCCESS,
            NoticeLevel::Error => colors::ERROR,
        };
        Line::from(Span::styled(format!(" {}", notice.text), Style::default().fg(color)))
    } else {
        let keybinds = [
            ("a", "Add"),
            ("e", "Edit"),
            ("d", "Delete"),
            ("f", "Favorite"),
            ("F", "★ only"),
            ("t", "Time"),
            ("s", "Sort"),
            ("/", "Search"),
            ("n/p", "Page"),
            ("?", "Help"),
            ("q", "Quit"),
        ];
        let mut spans = vec![Span::raw(" ")];
        for (key, desc) in keybinds {
            spans.push(Span::styled(format!("<{}>", key), Style::default().fg(colors::KEYBIND)));
            spans.push(Span::raw(format!(" {}  ", desc)));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(content).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Create/edit modal
fn render_form(state: &AppState, form_state: &FormState, frame: &mut Frame, area: Rect) {
    trace!(focus = ?form_state.focus, "render_form: called");
    let popup_area = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup_area);

    let draft = state.form.draft();
    let title = if state.form.is_editing() {
        " Edit Recipe "
    } else {
        " New Recipe "
    };

    let image_value = if state.image_loading {
        format!("{} (loading...)", form_state.image_path)
    } else if !form_state.image_path.is_empty() || form_state.focus == Field::Image {
        form_state.image_path.clone()
    } else {
        match &draft.image {
            Some(uri) => describe_data_uri(uri),
            None => String::new(),
        }
    };
    let minutes = if draft.preparation_time == 0 {
        String::new()
    } else {
        draft.preparation_time.to_string()
    };

    let mut lines = vec![Line::from("")];
    for field in Field::ALL {
        let value = match field {
            Field::Image => image_value.as_str(),
            Field::Title => draft.title.as_str(),
            Field::Ingredients => draft.ingredients.as_str(),
            Field::Instructions => draft.instructions.as_str(),
            Field::PreparationTime => minutes.as_str(),
        };
        lines.push(form_line(field, value, field == form_state.focus));
    }
    lines.push(Line::from(""));
    if draft.image.is_some() && form_state.focus == Field::Image {
        lines.push(Line::from(Span::styled(
            format!("  current: {}", draft.image.as_deref().map(describe_data_uri).unwrap_or_default()),
            Style::default().fg(colors::DIM),
        )));
    }
    lines.push(Line::from(Span::styled(
        "  Tab/↑↓: field  Enter: load image / next  Ctrl+S: save  Esc: cancel",
        Style::default().fg(colors::DIM),
    )));

    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::HEADER)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(form, popup_area);
}

fn form_line(field: Field, value: &str, focused: bool) -> Line<'_> {
    let label_style = if focused {
        Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::DIM)
    };
    let value_style = if focused {
        Style::default().bg(colors::FOCUS_BG)
    } else {
        Style::default()
    };
    let mut spans = vec![
        Span::styled(if focused { "▸ " } else { "  " }, label_style),
        Span::styled(format!("{:<18}", field.label()), label_style),
        Span::styled(value, value_style),
    ];
    if focused {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    Line::from(spans)
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    trace!("render_help_overlay: called");
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::HEADER),
        )]),
        Line::from(""),
        section("Recipes"),
        key_line("a", "Add a recipe"),
        key_line("e/Enter", "Edit selected recipe"),
        key_line("d", "Delete selected recipe"),
        key_line("f", "Toggle favorite"),
        Line::from(""),
        section("Browsing"),
        key_line("j/↓ k/↑", "Select card"),
        key_line("n/→ p/←", "Next / previous page"),
        key_line("1-9", "Jump to page"),
        key_line("s", "Toggle sort by time"),
        key_line("t", "Cycle time filter"),
        key_line("F", "Favorites only"),
        key_line("/", "Search title or ingredients"),
        key_line("Esc", "Clear notice / search"),
        Line::from(""),
        section("Form"),
        key_line("Tab/S-Tab", "Next / previous field"),
        key_line("Enter", "Load image path / next field"),
        key_line("Ctrl+S", "Save"),
        key_line("Esc", "Cancel"),
        Line::from(""),
        key_line("?", "Toggle help"),
        key_line("q", "Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::HEADER)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(help, popup_area);
}

fn section(name: &str) -> Line<'_> {
    Line::from(vec![Span::styled(name, Style::default().add_modifier(Modifier::BOLD))])
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

/// Render confirmation dialog
fn render_confirm_dialog(dialog: &ConfirmDialog, frame: &mut Frame, area: Rect) {
    trace!("render_confirm_dialog: called");
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(" y ", Style::default().fg(Color::Black).bg(Color::Green)),
            Span::raw(" delete    "),
            Span::styled(" n ", Style::default().fg(Color::Black).bg(Color::Red)),
            Span::raw(" keep"),
        ]),
    ];

    let dialog_widget = Paragraph::new(content)
        .block(
            Block::default()
                .title(" Confirm ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors::ERROR)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(dialog_widget, popup_area);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    trace!(percent_x, percent_y, "centered_rect: called");
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use recipestore::{PageView, RecipeId};

    fn recipe(title: &str, minutes: u32, favorite: bool) -> Recipe {
        Recipe {
            id: RecipeId::generate(),
            image: Some("data:image/png;base64,AAAA".to_string()),
            title: title.to_string(),
            ingredients: "eggs".to_string(),
            instructions: "cook".to_string(),
            preparation_time: minutes,
            favorite,
        }
    }

    fn screen(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| render(state, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_renders_cards_and_counts() {
        let mut state = AppState::new(3);
        state.total_recipes = 2;
        state.total_favorites = 1;
        state.set_page(PageView {
            items: vec![recipe("Pancakes", 20, true), recipe("Stew", 90, false)],
            page: 1,
            page_count: 1,
            total_matches: 2,
        });

        let text = screen(&state);
        assert!(text.contains("RecipeBox"));
        assert!(text.contains("2 recipes"));
        assert!(text.contains("Pancakes"));
        assert!(text.contains("90 min"));
        assert!(text.contains("page 1/1"));
    }

    #[test]
    fn test_renders_empty_and_form() {
        let mut state = AppState::new(3);
        assert!(screen(&state).contains("No recipes yet"));

        state.interaction_mode = InteractionMode::Form(FormState::default());
        let text = screen(&state);
        assert!(text.contains("New Recipe"));
        assert!(text.contains("Preparation"));
    }
}

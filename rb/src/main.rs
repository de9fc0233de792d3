//! RecipeBox - terminal recipe manager
//!
//! CLI entry point: opens the TUI by default, or runs one scripting command.

use std::fs;
use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use recipestore::{FileStore, OpenNotice, Query, Recipe, RecipeBook, RecipeDraft};
use tracing::{debug, info, warn};

use recipebox::cli::{Cli, Command, OutputFormat, resolve_id};
use recipebox::config::Config;
use recipebox::image::{describe_data_uri, load_data_uri_blocking};
use recipebox::tui;

const LOG_FILE: &str = "recipebox.log";

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref(), &config.log_dir)
        .context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    if let Some(Command::Path) = cli.command {
        return cmd_path(&config);
    }

    let store = FileStore::open(&config.store_path)
        .context(format!("Failed to open store at {}", config.store_path.display()))?;
    let (mut book, notice) = RecipeBook::open(store, config.storage_key.as_str()).context("Failed to open recipes")?;

    match cli.command {
        None | Some(Command::Tui) => return tui::run(book, notice, &config).await,
        _ => report_notice(notice.as_ref()),
    }

    match cli.command {
        Some(Command::List {
            sort,
            bucket,
            search,
            favorites,
            page,
            page_size,
            format,
        }) => {
            let page_size = page_size.unwrap_or(config.page_size);
            if page_size == 0 {
                return Err(eyre::eyre!("--page-size must be at least 1"));
            }
            let query = Query {
                sort,
                bucket,
                search: search.unwrap_or_default(),
                favorites_only: favorites,
                page,
                page_size,
            };
            cmd_list(&book, &query, format)
        }
        Some(Command::Show { id }) => {
            let id = resolve_id(&book, &id)?;
            if let Some(recipe) = book.get(&id) {
                print_recipe(recipe);
            }
            Ok(())
        }
        Some(Command::Add {
            title,
            ingredients,
            instructions,
            minutes,
            image,
            favorite,
        }) => {
            let image = load_data_uri_blocking(&image, config.max_image_bytes)?;
            let draft = RecipeDraft {
                image: Some(image),
                title,
                ingredients,
                instructions,
                preparation_time: minutes,
                favorite,
            };
            let id = book.add(draft)?;
            println!("{} Recipe saved: {}", "✓".green(), id.to_string().cyan());
            Ok(())
        }
        Some(Command::Edit {
            id,
            title,
            ingredients,
            instructions,
            minutes,
            image,
        }) => {
            let id = resolve_id(&book, &id)?;
            let mut draft = book
                .get(&id)
                .map(Recipe::to_draft)
                .ok_or_else(|| eyre::eyre!("Recipe not found: {}", id))?;
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(ingredients) = ingredients {
                draft.ingredients = ingredients;
            }
            if let Some(instructions) = instructions {
                draft.instructions = instructions;
            }
            if let Some(minutes) = minutes {
                draft.preparation_time = minutes;
            }
            if let Some(path) = image {
                draft.image = Some(load_data_uri_blocking(&path, config.max_image_bytes)?);
            }
            book.update(&id, draft)?;
            println!("{} Recipe updated: {}", "✓".green(), id.to_string().cyan());
            Ok(())
        }
        Some(Command::Delete { id }) => {
            let id = resolve_id(&book, &id)?;
            let removed = book.delete(&id)?;
            println!("{} Deleted recipe: {}", "✓".green(), removed.title);
            Ok(())
        }
        Some(Command::Favorite { id }) => {
            let id = resolve_id(&book, &id)?;
            let favorite = book.toggle_favorite(&id)?;
            let title = book.get(&id).map(|r| r.title.as_str()).unwrap_or_default();
            if favorite {
                println!("{} {} added to favorites", "★".yellow(), title);
            } else {
                println!("{} {} removed from favorites", "☆".dimmed(), title);
            }
            Ok(())
        }
        None | Some(Command::Tui) | Some(Command::Path) => Ok(()),
    }
}

/// Corrupt data was set aside while opening; say so before anything else
fn report_notice(notice: Option<&OpenNotice>) {
    if let Some(notice) = notice {
        warn!(%notice, "main: recovered from unreadable data");
        eprintln!("{} {}", "!".yellow(), notice);
    }
}

fn cmd_list<S: recipestore::KeyValueStore>(book: &RecipeBook<S>, query: &Query, format: OutputFormat) -> Result<()> {
    debug!(?query, ?format, "cmd_list: called");
    let view = book.query(query);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "page": view.page,
                "pageCount": view.page_count,
                "totalMatches": view.total_matches,
                "recipes": view.items,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if view.is_empty() {
                if book.is_empty() {
                    println!("No recipes yet");
                } else {
                    println!("No recipes match");
                }
                return Ok(());
            }
            for recipe in &view.items {
                let star = if recipe.favorite { "★".yellow() } else { " ".normal() };
                println!(
                    "{} {} {} {}",
                    recipe.id.short().yellow(),
                    star,
                    recipe.title.bold(),
                    format!("({} min)", recipe.preparation_time).dimmed()
                );
                println!("           {}", recipe.ingredients.dimmed());
            }
            println!(
                "{}",
                format!(
                    "Page {}/{} ({} matching)",
                    view.page, view.page_count, view.total_matches
                )
                .dimmed()
            );
        }
    }
    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    let star = if recipe.favorite { " ★".yellow() } else { "".normal() };
    println!("{}{}", recipe.title.bold().cyan(), star);
    println!("  {:<14}{}", "ID:", recipe.id);
    println!("  {:<14}{} min", "Time:", recipe.preparation_time);
    println!(
        "  {:<14}{}",
        "Image:",
        recipe.image.as_deref().map(describe_data_uri).unwrap_or_else(|| "none".to_string())
    );
    println!("  {:<14}{}", "Ingredients:", recipe.ingredients);
    println!("  {:<14}{}", "Instructions:", recipe.instructions);
}

fn cmd_path(config: &Config) -> Result<()> {
    debug!("cmd_path: called");
    let store = FileStore::open(&config.store_path)?;
    println!("Recipes: {}", store.slot_path(&config.storage_key).display());
    println!("Log:     {}", config.log_dir.join(LOG_FILE).display());
    Ok(())
}

//! RecipeBox - terminal recipe manager
//!
//! A card-style recipe browser over a [`recipestore::RecipeBook`]. The
//! collection lives in one JSON slot under the configured store path.
//!
//! # Modules
//!
//! - [`tui`] - Interactive browser, form and search
//! - [`cli`] - Command-line interface and scripting subcommands
//! - [`config`] - Configuration types and loading
//! - [`image`] - Image files to data URIs

pub mod cli;
pub mod config;
pub mod image;
pub mod tui;

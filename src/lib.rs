//! IssueFeed - a command-line client for hosted issue trackers.
//!
//! Lists, searches and shows issues and their comments over the tracker's
//! Atom/GData feeds, and files new issues from a draft edited in `$EDITOR`.

pub mod api;
pub mod commands;
pub mod config;
pub mod content;
pub mod draft;
pub mod error;
pub mod logging;

pub use error::{AppError, Result};

//! Issue tracker feed client and types.
//!
//! This module provides the interface for the tracker's Atom/GData feeds and
//! the login endpoint that issues session tokens.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{login, Auth};
pub use client::FeedClient;
pub use error::ApiError;
pub use types::{Entry, Feed};

//! Search backend HTTP client and authentication.
//!
//! This module provides the [`SearchClient`] for querying a search cluster,
//! along with the [`Auth`] credential type.

mod auth;
mod search;

pub use auth::Auth;
pub use search::SearchClient;

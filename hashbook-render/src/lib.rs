//! # hashbook-render
//!
//! Renders the hash-routed application shell with Askama.

pub mod templates;

pub use askama::Template;
pub use templates::AppShellTemplate;

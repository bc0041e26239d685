//! Askama template definitions.

use askama::Template;
use hashbook_core::Config;

/// Single-page application shell written as `index.html`
///
/// All page content is fetched from `db.json` at runtime; the shell itself
/// only carries site-wide values.
#[derive(Template)]
#[template(path = "app.html")]
pub struct AppShellTemplate {
    // Site metadata
    pub site_title: String,

    // Absolute site URL without a trailing slash
    pub base_url: String,
}

impl AppShellTemplate {
    pub fn from_config(config: &Config) -> Self {
        Self {
            site_title: config.site_title.clone(),
            base_url: config.normalized_base_url(),
        }
    }
}

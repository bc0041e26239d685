//! Build command implementation.

use anyhow::{Context, Result};
use hashbook_core::output::{write_output, Artifacts};
use hashbook_core::{render_sitemap, Config, SiteBuilder};
use hashbook_render::{AppShellTemplate, Template};
use std::path::{Path, PathBuf};

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct BuildOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub base_url: Option<String>,
}

/// Build the site and write its artifacts
pub fn build_site(config_path: &Path, overrides: BuildOverrides) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let artifacts = render_artifacts(&config)?;

    let output_dir = config.output_dir();
    write_output(&output_dir, &config.input_dir(), &artifacts)
        .with_context(|| format!("Failed to write output to {:?}", output_dir))?;

    tracing::info!("✓ Output written to {:?}", output_dir);
    Ok(())
}

/// Load the config file (or defaults) and apply command-line overrides.
pub fn load_config(config_path: &Path, overrides: BuildOverrides) -> Result<Config> {
    tracing::debug!("Loading config from {:?}", config_path);
    let mut config =
        Config::load_or_default(config_path).context("Failed to load configuration")?;

    // Command-line paths are relative to the working directory, not the config file
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    if let Some(input) = overrides.input {
        config.input_dir = cwd.join(input);
    }
    if let Some(output) = overrides.output {
        config.output_dir = cwd.join(output);
    }
    if let Some(base_url) = overrides.base_url {
        config.base_url = base_url;
    }

    Ok(config)
}

/// Build everything in memory; nothing touches the output directory here.
fn render_artifacts(config: &Config) -> Result<Artifacts> {
    tracing::info!("Building site: {}", config.site_title);

    let builder = SiteBuilder::new(config.clone());
    let output = builder
        .build()
        .with_context(|| format!("Failed to build site from {:?}", config.input_dir()))?;

    let db_json = output
        .site
        .to_json()
        .context("Failed to serialize db.json")?;

    let index_html = AppShellTemplate::from_config(config)
        .render()
        .context("Failed to render index.html")?;

    let today = chrono::Local::now().date_naive();
    let sitemap_xml = render_sitemap(&config.normalized_base_url(), &output.slugs, today);

    tracing::info!("✓ Built {} pages", output.site.pages.len());

    Ok(Artifacts {
        db_json,
        index_html,
        sitemap_xml,
    })
}

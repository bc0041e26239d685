//! Init command implementation.

use anyhow::{bail, Context, Result};
use hashbook_core::config::CONFIG_FILE_NAME;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# hashbook configuration
site_title: "Documentation"
input_dir: "content"
output_dir: "public"
base_url: "https://mysite.com"
"#;

const HOME_PAGE: &str = r#"---
title: Home
weight: 0
---
Welcome to your new hashbook site. Every markdown file under `content/`
becomes a page, and folders become sections in the navigation menu.

Start with the [[guide/intro|introduction]].
"#;

const INTRO_PAGE: &str = r#"---
title: Introduction
weight: 1
published on: 2025-01-01
---
Pages link to each other with `[[slug]]` or `[[slug|text]]`.

## Transclusion

A section of another page can be embedded with `{{ref:slug#heading-id}}`.
The section runs until the next heading of the same or higher level.

## Building

Run `hashbook build` and serve the `public/` directory.
"#;

/// Initialize a new hashbook project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));

    let files: [(PathBuf, &str); 3] = [
        (root.join(CONFIG_FILE_NAME), DEFAULT_CONFIG),
        (root.join("content").join("index.md"), HOME_PAGE),
        (root.join("content").join("guide").join("intro.md"), INTRO_PAGE),
    ];

    if let Some((existing, _)) = files.iter().find(|(path, _)| path.exists()) {
        bail!("Refusing to overwrite existing file {:?}", existing);
    }

    for (path, contents) in &files {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
        }
        fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
        println!("Created {:?}", path);
    }

    println!("✓ hashbook initialized in {:?}", root);
    println!("  - Edit {} to customize the site", CONFIG_FILE_NAME);
    println!("  - Run `hashbook build` to generate public/");
    Ok(())
}

//! # hashbook-core
//!
//! Core library for the hashbook documentation builder.
//!
//! This crate turns a directory of markdown documents into the payload a
//! hash-routed single-page shell consumes: rendered pages, a navigation
//! tree, and a sitemap. It also resolves transclusions and verifies
//! internal links against the built site.

pub mod builder;
pub mod config;
pub mod frontmatter;
pub mod markdown;
pub mod menu;
pub mod models;
pub mod output;
pub mod sitemap;
pub mod slug;
pub mod transclude;
pub mod verify;

pub use builder::{BuildError, BuildOutput, SiteBuilder};
pub use config::{Config, ConfigError};
pub use markdown::{MarkdownProcessor, ProcessedDocument, RenderOptions};
pub use models::{
    Diagnostic, DiagnosticSeverity, MenuItem, MetaValue, Metadata, Page, Site, TocEntry,
};
pub use output::{write_output, Artifacts, OutputError};
pub use sitemap::render_sitemap;
pub use slug::slugify;
pub use transclude::{resolve_section, TranscludeError};
pub use verify::verify_site;

//! Site building logic - walks the input tree and assembles the site payload.

use crate::{
    config::Config,
    frontmatter::FrontmatterError,
    markdown::{MarkdownProcessor, RenderOptions},
    menu,
    models::{Page, Site},
    slug::{display_title, page_slug, path_segments},
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Input directory not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Failed to walk input directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },
}

/// Everything produced by one build run
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub site: Site,

    /// Page slugs in walk order (duplicates included), for the sitemap
    pub slugs: Vec<String>,
}

/// A document located under the input root
#[derive(Debug, Clone)]
struct SourceDocument {
    path: PathBuf,
    /// Path relative to the input root with `/` separators
    rel_path: String,
}

/// Main site builder
pub struct SiteBuilder {
    config: Config,
    processor: MarkdownProcessor,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        let processor = MarkdownProcessor::new(RenderOptions::from(&config));
        Self { config, processor }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the entire site in memory
    pub fn build(&self) -> Result<BuildOutput, BuildError> {
        let input_dir = self.config.input_dir();
        if !input_dir.is_dir() {
            return Err(BuildError::MissingInput(input_dir));
        }

        let documents = discover_markdown_files(&input_dir)?;
        tracing::info!("Found {} markdown files", documents.len());

        let mut output = BuildOutput::default();

        for doc in &documents {
            let slug = page_slug(&doc.rel_path);
            let page = self.build_page(doc, &slug)?;
            tracing::debug!("Processed {} -> {}", doc.rel_path, slug);

            menu::insert(
                &mut output.site.menu,
                &path_segments(&doc.rel_path),
                &slug,
                &page.title,
                page.weight,
            );

            if output.site.pages.insert(slug.clone(), page).is_some() {
                tracing::warn!("Duplicate slug {}; {} replaces the earlier page", slug, doc.rel_path);
            }
            output.slugs.push(slug);
        }

        tracing::info!("Built site with {} pages", output.site.pages.len());
        Ok(output)
    }

    fn build_page(&self, doc: &SourceDocument, slug: &str) -> Result<Page, BuildError> {
        let bytes = fs::read(&doc.path).map_err(|source| BuildError::Read {
            path: doc.path.clone(),
            source,
        })?;
        // Invalid UTF-8 sequences become U+FFFD instead of failing the run
        let source = String::from_utf8_lossy(&bytes);

        let processed = self
            .processor
            .process(&source)
            .map_err(|source| BuildError::Document {
                path: doc.path.clone(),
                source,
            })?;

        let meta = &processed.metadata;
        let mut title = meta.title();
        if title.is_empty() {
            title = if slug == "/" {
                "Home".to_string()
            } else {
                let stem = path_segments(&doc.rel_path).pop().unwrap_or_default();
                display_title(&stem)
            };
        }

        Ok(Page {
            title,
            content: processed.html,
            toc: processed.toc,
            published: meta.published(),
            updated: meta.updated(),
            category: meta.category(),
            description: processed.description,
            weight: meta.weight(),
        })
    }
}

/// Discover all markdown files under the input root.
///
/// Within a directory, files come before subdirectories and each group is
/// in file name order, so a directory's `index.md` precedes its children.
fn discover_markdown_files(input_dir: &Path) -> Result<Vec<SourceDocument>, BuildError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(input_dir).sort_by(|a, b| {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map_or(true, |ext| ext != "md") {
            continue;
        }

        let rel = entry.path().strip_prefix(input_dir).unwrap_or(entry.path());
        let rel_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        files.push(SourceDocument {
            path: entry.path().to_path_buf(),
            rel_path,
        });
    }

    Ok(files)
}

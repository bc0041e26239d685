//! Markdown processing pipeline with custom extensions.

pub mod directives;
pub mod highlight;

use crate::config::Config;
use crate::frontmatter::{parse_frontmatter, FrontmatterError};
use crate::models::{Metadata, TocEntry};
use crate::slug::slugify;
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashSet;

pub use directives::DirectiveTransformer;
pub use highlight::HighlightTransformer;

/// Longest description synthesized from the first paragraph
pub const DESCRIPTION_LIMIT: usize = 160;

const ELLIPSIS: &str = "...";

/// Renderer settings, fixed for the duration of a build
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Render soft line breaks as `<br />`
    pub hard_wraps: bool,

    /// syntect theme name used for fenced code blocks
    pub highlight_theme: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            hard_wraps: true,
            highlight_theme: highlight::DEFAULT_THEME.to_string(),
        }
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            hard_wraps: config.hard_wraps,
            highlight_theme: config.highlight_theme.clone(),
        }
    }
}

/// Result of processing one document
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub html: String,
    pub metadata: Metadata,
    pub toc: Vec<TocEntry>,
    pub description: String,
}

/// Markdown processor with custom extensions
pub struct MarkdownProcessor {
    options: Options,
    hard_wraps: bool,
    highlighter: HighlightTransformer,
}

impl MarkdownProcessor {
    pub fn new(render: RenderOptions) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            options,
            hard_wraps: render.hard_wraps,
            highlighter: HighlightTransformer::new(&render.highlight_theme),
        }
    }

    /// Process a whole document: front matter, description, TOC and HTML.
    pub fn process(&self, source: &str) -> Result<ProcessedDocument, FrontmatterError> {
        let (metadata, body) = parse_frontmatter(source)?;

        let events: Vec<Event> = Parser::new_ext(body, self.options).collect();

        let toc = collect_headings(&events);

        let description = match metadata.description() {
            desc if !desc.is_empty() => desc,
            _ => first_paragraph_text(&events)
                .map(|text| truncate_description(&text))
                .unwrap_or_default(),
        };

        let events = attach_heading_ids(events, &toc);

        let events = DirectiveTransformer::new().transform(events);

        let events = if self.hard_wraps {
            events
                .into_iter()
                .map(|event| match event {
                    Event::SoftBreak => Event::HardBreak,
                    other => other,
                })
                .collect()
        } else {
            events
        };

        let events = self.highlighter.transform(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(ProcessedDocument {
            html: html_output,
            metadata,
            toc,
            description,
        })
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

/// Collect headings in document order, assigning each a unique anchor id.
///
/// The first heading with an explicit `{#id}` keeps it; other headings get
/// the slugified text. Any repeat is de-duplicated with `-1`, `-2`, ...
/// suffixes, and generated ids never take an explicit id.
fn collect_headings(events: &[Event]) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    let mut explicit_seen: HashSet<String> = HashSet::new();
    let mut used: HashSet<String> = events
        .iter()
        .filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        })
        .collect();
    let mut current: Option<(u32, Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((*level as u32, id.as_ref().map(|s| s.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, ref mut title)) = current {
                    title.push_str(text.as_ref());
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit, title)) = current.take() {
                    let id = match explicit {
                        Some(id) if explicit_seen.insert(id.clone()) => id,
                        Some(id) => unique_id(&id, &mut used),
                        None => unique_id(&slugify(&title), &mut used),
                    };
                    toc.push(TocEntry { title, id, level });
                }
            }
            _ => {}
        }
    }

    toc
}

fn unique_id(base: &str, used: &mut HashSet<String>) -> String {
    let base = if base.is_empty() { "heading" } else { base };
    if used.insert(base.to_string()) {
        return base.to_string();
    }

    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn attach_heading_ids<'a>(events: Vec<Event<'a>>, headings: &[TocEntry]) -> Vec<Event<'a>> {
    let mut heading_iter = headings.iter();

    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let id = heading_iter
                    .next()
                    .map(|h| h.id.clone().into())
                    .or(id);
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                })
            }
            other => other,
        })
        .collect()
}

/// Direct text of the first top-level paragraph.
///
/// Text nested in inline formatting (emphasis, links, ...) and code spans
/// is skipped; line breaks count as a single space.
fn first_paragraph_text(events: &[Event]) -> Option<String> {
    let mut depth = 0usize;
    let mut paragraph: Option<String> = None;

    for event in events {
        match event {
            Event::Start(Tag::Paragraph) if depth == 0 => {
                paragraph = Some(String::new());
                depth += 1;
            }
            Event::Start(_) => depth += 1,
            Event::End(TagEnd::Paragraph) if depth == 1 && paragraph.is_some() => {
                return paragraph;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(text) if depth == 1 => {
                if let Some(p) = paragraph.as_mut() {
                    p.push_str(text);
                }
            }
            Event::SoftBreak | Event::HardBreak if depth == 1 => {
                if let Some(p) = paragraph.as_mut() {
                    p.push(' ');
                }
            }
            _ => {}
        }
    }

    paragraph
}

/// Cap a description at [`DESCRIPTION_LIMIT`] characters, ending in `...` when cut.
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }

    let keep = DESCRIPTION_LIMIT - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

pub(crate) fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

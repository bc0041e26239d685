//! Section extraction for `{{ref:slug#id}}` transclusions.
//!
//! Rendered page HTML is scanned as a flat list of top-level elements. A
//! section starts at the element carrying the requested `id` and runs over
//! its following siblings until a heading of the same or higher rank.

use crate::markdown::directives::{normalize_slug, PLACEHOLDER_CLASS, REF_ERROR_CLASS, WIKILINK_CLASS};
use crate::models::Page;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscludeError {
    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("No element with id '{id}' on page {slug}")]
    AnchorNotFound { slug: String, id: String },
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// A top-level element of a rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<'a> {
    /// Lowercased tag name
    pub tag: String,
    pub id: Option<String>,
    /// Outer HTML, verbatim
    pub html: &'a str,
}

impl Element<'_> {
    /// `Some(1..=6)` for `h1`-`h6`
    pub fn heading_level(&self) -> Option<u32> {
        let level = self.tag.strip_prefix('h')?.parse::<u32>().ok()?;
        (1..=6).contains(&level).then_some(level)
    }
}

/// Resolve `{{ref:slug#id}}` against the built pages.
pub fn resolve_section(
    pages: &BTreeMap<String, Page>,
    slug: &str,
    id: &str,
) -> Result<String, TranscludeError> {
    let slug = normalize_slug(slug);
    let page = pages
        .get(&slug)
        .ok_or_else(|| TranscludeError::PageNotFound(slug.clone()))?;

    extract_section(&page.content, id).ok_or_else(|| TranscludeError::AnchorNotFound {
        slug,
        id: id.to_string(),
    })
}

/// Extract the section anchored at `id`, or `None` when no top-level element has it.
pub fn extract_section(html: &str, id: &str) -> Option<String> {
    let elements = top_level_elements(html);
    let start = elements.iter().position(|el| el.id.as_deref() == Some(id))?;
    let start_level = elements[start].heading_level();

    let mut parts = vec![elements[start].html];
    for el in &elements[start + 1..] {
        if let (Some(limit), Some(level)) = (start_level, el.heading_level()) {
            if level <= limit {
                break;
            }
        }
        parts.push(el.html);
    }

    Some(parts.join("\n"))
}

/// Split an HTML fragment into its top-level elements.
///
/// Comments, doctypes, processing instructions and bare text between
/// elements are skipped. An element left open at the end of input runs to
/// the end of the fragment.
pub fn top_level_elements(html: &str) -> Vec<Element<'_>> {
    let mut elements = Vec::new();
    let mut pos = 0;
    let mut depth = 0usize;
    let mut open: Option<(usize, String, Option<String>)> = None;

    while let Some(offset) = html[pos..].find('<') {
        let start = pos + offset;
        let rest = &html[start..];

        if rest.starts_with("<!--") {
            pos = rest.find("-->").map_or(html.len(), |end| start + end + 3);
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            pos = rest.find('>').map_or(html.len(), |end| start + end + 1);
            continue;
        }

        if let Some(closing) = rest.strip_prefix("</") {
            let Some(end) = closing.find('>') else {
                break;
            };
            pos = start + 2 + end + 1;
            if depth > 0 {
                depth -= 1;
                if depth == 0 {
                    if let Some((begin, tag, id)) = open.take() {
                        elements.push(Element { tag, id, html: &html[begin..pos] });
                    }
                }
            }
            continue;
        }

        if !rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            pos = start + 1;
            continue;
        }

        let Some(tag_end) = find_tag_end(html, start) else {
            break;
        };
        let inner = &html[start + 1..tag_end];
        let name_len = inner
            .find(|c: char| c.is_ascii_whitespace() || c == '/')
            .unwrap_or(inner.len());
        let tag = inner[..name_len].to_ascii_lowercase();
        let attrs = &inner[name_len..];
        pos = tag_end + 1;

        let self_closing = inner.ends_with('/') || VOID_ELEMENTS.contains(&tag.as_str());

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let close_tag = format!("</{tag}");
            let close = html[pos..]
                .to_ascii_lowercase()
                .find(&close_tag)
                .and_then(|rel| html[pos + rel..].find('>').map(|gt| pos + rel + gt + 1))
                .unwrap_or(html.len());
            if depth == 0 {
                elements.push(Element { id: attribute_id(attrs), tag, html: &html[start..close] });
            }
            pos = close;
            continue;
        }

        if self_closing {
            if depth == 0 {
                elements.push(Element { id: attribute_id(attrs), tag, html: &html[start..pos] });
            }
            continue;
        }

        if depth == 0 {
            open = Some((start, tag, attribute_id(attrs)));
        }
        depth += 1;
    }

    if let Some((begin, tag, id)) = open {
        elements.push(Element { tag, id, html: &html[begin..] });
    }

    elements
}

/// Position of the `>` closing the tag opened at `start`, skipping quoted values.
fn find_tag_end(html: &str, start: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, &b) in html.as_bytes()[start..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(start + i),
            None => {}
        }
    }
    None
}

fn attribute_id(attrs: &str) -> Option<String> {
    static ID: OnceLock<Regex> = OnceLock::new();
    let re = ID.get_or_init(|| {
        Regex::new(r#"(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
            .expect("Invalid id attribute regex")
    });

    let caps = re.captures(attrs)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| unescape_html(m.as_str()))
}

/// Transclusion addresses `(slug, id)` found in rendered HTML, in document order.
pub fn find_references(html: &str) -> Vec<(String, String)> {
    static REF: OnceLock<Regex> = OnceLock::new();
    let re = REF.get_or_init(|| {
        Regex::new(&format!(
            r#"<div class="{PLACEHOLDER_CLASS}" data-slug="([^"]*)" data-id="([^"]*)""#
        ))
        .expect("Invalid placeholder regex")
    });

    re.captures_iter(html)
        .map(|caps| (unescape_html(&caps[1]), unescape_html(&caps[2])))
        .collect()
}

/// Internal link targets found in rendered HTML, in document order.
pub fn find_links(html: &str) -> Vec<String> {
    static LINK: OnceLock<Regex> = OnceLock::new();
    let re = LINK.get_or_init(|| {
        Regex::new(&format!(r##"<a class="{WIKILINK_CLASS}" href="#([^"]*)""##))
            .expect("Invalid wikilink regex")
    });

    re.captures_iter(html)
        .map(|caps| unescape_html(&caps[1]))
        .collect()
}

/// Text of the malformed reference markers in rendered HTML.
pub fn find_invalid_refs(html: &str) -> Vec<String> {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let re = INVALID.get_or_init(|| {
        Regex::new(&format!(r#"<span class="{REF_ERROR_CLASS}">\[Invalid Ref: ([^<]*)\]</span>"#))
            .expect("Invalid ref-error regex")
    });

    re.captures_iter(html)
        .map(|caps| unescape_html(&caps[1]))
        .collect()
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

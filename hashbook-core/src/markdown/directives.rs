//! Inline directive expansion: `[[slug|text]]` links and `{{ref:slug#id}}` transclusions.

use super::html_escape;
use pulldown_cmark::{html, CowStr, Event, Tag, TagEnd};
use std::collections::VecDeque;

const LINK_OPEN: &str = "[[";
const LINK_CLOSE: &str = "]]";
const REF_OPEN: &str = "{{ref:";
const REF_CLOSE: &str = "}}";

/// CSS class on expanded internal links
pub const WIKILINK_CLASS: &str = "wikilink";
/// CSS class on transclusion placeholders
pub const PLACEHOLDER_CLASS: &str = "transclusion-placeholder";
/// CSS class on malformed reference markers
pub const REF_ERROR_CLASS: &str = "ref-error";

/// Transformer for internal links and transclusion references
///
/// Operates on merged text runs, so directives inside code blocks and
/// inline code spans are left untouched. A link whose display text carries
/// inline markup (`[[slug|Read *the* Guide]]`) spans several events and is
/// stitched back together.
#[derive(Debug, Default)]
pub struct DirectiveTransformer;

impl DirectiveTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, events: Vec<Event<'_>>) -> Vec<Event<'static>> {
        let mut queue: VecDeque<Event<'static>> = merge_text_runs(events).into();
        let mut result = Vec::with_capacity(queue.len());
        let mut in_code_block = false;

        while let Some(event) = queue.pop_front() {
            let text = match event {
                Event::Text(text) if !in_code_block => text,
                other => {
                    match &other {
                        Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
                        Event::End(TagEnd::CodeBlock) => in_code_block = false,
                        _ => {}
                    }
                    result.push(other);
                    continue;
                }
            };

            if !text.contains(LINK_OPEN) && !text.contains(REF_OPEN) {
                result.push(Event::Text(text));
                continue;
            }

            let (expanded, open_link) = expand_directives(&text);
            result.extend(expanded);

            let Some(tail) = open_link else {
                continue;
            };
            match stitch_link(&tail, &mut queue) {
                Some((anchor, rest)) => {
                    result.push(Event::InlineHtml(anchor));
                    if !rest.is_empty() {
                        queue.push_front(Event::Text(CowStr::from(rest)));
                    }
                }
                None => {
                    // The opener stays literal; the rest is scanned again
                    result.push(Event::Text(CowStr::from(LINK_OPEN)));
                    let rest = &tail[LINK_OPEN.len()..];
                    if !rest.is_empty() {
                        queue.push_front(Event::Text(CowStr::from(rest.to_string())));
                    }
                }
            }
        }

        lift_block_placeholders(result)
    }
}

/// Merge adjacent text events outside code blocks into single runs.
fn merge_text_runs(events: Vec<Event<'_>>) -> Vec<Event<'static>> {
    let mut result = Vec::with_capacity(events.len());
    let mut in_code_block = false;
    let mut pending = String::new();

    for event in events {
        if let Event::Text(text) = &event {
            if !in_code_block {
                pending.push_str(text);
                continue;
            }
        }

        if !pending.is_empty() {
            result.push(Event::Text(CowStr::from(std::mem::take(&mut pending))));
        }

        match &event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            _ => {}
        }
        result.push(event.into_static());
    }
    if !pending.is_empty() {
        result.push(Event::Text(CowStr::from(pending)));
    }

    result
}

/// Split a text run into plain text and expanded directive events.
///
/// A `[[` left open at the end of the run is returned as the unconsumed
/// tail, starting at the opener, so the caller can look past inline markup
/// for its `]]`.
fn expand_directives(text: &str) -> (Vec<Event<'static>>, Option<String>) {
    let mut events = Vec::new();
    let mut plain = String::new();
    let mut remaining = text;
    let mut open_link = None;

    loop {
        let next_link = remaining.find(LINK_OPEN);
        let next_ref = remaining.find(REF_OPEN);

        let (start, is_ref) = match (next_link, next_ref) {
            (Some(l), Some(r)) if r < l => (r, true),
            (Some(l), _) => (l, false),
            (None, Some(r)) => (r, true),
            (None, None) => break,
        };
        let (open, close) = if is_ref {
            (REF_OPEN, REF_CLOSE)
        } else {
            (LINK_OPEN, LINK_CLOSE)
        };

        let inner_start = start + open.len();
        let Some(inner_len) = remaining[inner_start..].find(close) else {
            if is_ref {
                // Unterminated reference: the opener stays literal
                plain.push_str(&remaining[..inner_start]);
                remaining = &remaining[inner_start..];
                continue;
            }
            plain.push_str(&remaining[..start]);
            open_link = Some(remaining[start..].to_string());
            remaining = "";
            break;
        };
        let inner = &remaining[inner_start..inner_start + inner_len];
        let directive_end = inner_start + inner_len + close.len();

        let expanded = if is_ref {
            Some(expand_reference(inner))
        } else {
            expand_link(inner).map(Event::InlineHtml)
        };

        match expanded {
            Some(event) => {
                plain.push_str(&remaining[..start]);
                if !plain.is_empty() {
                    events.push(Event::Text(CowStr::from(std::mem::take(&mut plain))));
                }
                events.push(event);
            }
            None => plain.push_str(&remaining[..directive_end]),
        }
        remaining = &remaining[directive_end..];
    }

    plain.push_str(remaining);
    if !plain.is_empty() {
        events.push(Event::Text(CowStr::from(plain)));
    }
    (events, open_link)
}

/// Complete a `[[slug|display]]` link whose display text spans inline markup.
///
/// `tail` starts at `[[` and must hold the `|` separator. Following inline
/// events are consumed up to the text run holding `]]`; any block boundary,
/// nested link, or unbalanced markup leaves the queue untouched. Returns the
/// anchor HTML and the text after `]]`.
fn stitch_link(
    tail: &str,
    queue: &mut VecDeque<Event<'static>>,
) -> Option<(CowStr<'static>, String)> {
    let (target, lead) = tail[LINK_OPEN.len()..].split_once('|')?;
    let target = target.trim();
    if target.is_empty() {
        return None;
    }

    let mut depth = 0usize;
    let mut close_at = None;
    for (i, event) in queue.iter().enumerate() {
        match event {
            Event::Text(text) if text.contains(LINK_CLOSE) => {
                if depth == 0 {
                    close_at = Some(i);
                }
                break;
            }
            Event::Text(_)
            | Event::Code(_)
            | Event::InlineHtml(_)
            | Event::SoftBreak
            | Event::HardBreak => {}
            Event::Start(Tag::Emphasis | Tag::Strong | Tag::Strikethrough) => depth += 1,
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough) => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            _ => return None,
        }
    }
    let close_at = close_at?;

    let mut display: Vec<Event<'static>> = queue.drain(..close_at).collect();
    let Some(Event::Text(closing)) = queue.pop_front() else {
        return None;
    };
    let (trail, rest) = closing.split_once(LINK_CLOSE)?;

    let lead = lead.trim_start();
    if !lead.is_empty() {
        display.insert(0, Event::Text(CowStr::from(lead.to_string())));
    }
    let trail = trail.trim_end();
    if !trail.is_empty() {
        display.push(Event::Text(CowStr::from(trail.to_string())));
    }

    let mut text_html = String::new();
    html::push_html(&mut text_html, display.into_iter());

    let href = format!("#{}", normalize_slug(target));
    let anchor = format!(
        r#"<a class="{WIKILINK_CLASS}" href="{}">{}</a>"#,
        html_escape(&href),
        text_html
    );
    Some((CowStr::from(anchor), rest.to_string()))
}

/// Normalize a page slug to start with `/`.
pub fn normalize_slug(slug: &str) -> String {
    if slug.starts_with('/') {
        slug.to_string()
    } else {
        format!("/{slug}")
    }
}

/// `[[slug]]` or `[[slug|display text]]`; an empty target is not a link.
fn expand_link(inner: &str) -> Option<CowStr<'static>> {
    let (target, display) = match inner.split_once('|') {
        Some((target, display)) => (target.trim(), Some(display.trim())),
        None => (inner.trim(), None),
    };
    if target.is_empty() {
        return None;
    }

    let href = format!("#{}", normalize_slug(target));
    let text = display.unwrap_or(target);
    Some(CowStr::from(format!(
        r#"<a class="{WIKILINK_CLASS}" href="{}">{}</a>"#,
        html_escape(&href),
        html_escape(text)
    )))
}

/// `{{ref:slug#id}}` becomes a placeholder block; anything else is an inline error.
fn expand_reference(inner: &str) -> Event<'static> {
    let target = inner
        .split_once('#')
        .map(|(slug, id)| (slug.trim(), id.trim()))
        .filter(|(slug, id)| !slug.is_empty() && !id.is_empty());

    match target {
        Some((slug, id)) => Event::Html(CowStr::from(format!(
            r#"<div class="{PLACEHOLDER_CLASS}" data-slug="{}" data-id="{}"><span class="transclusion-loading">Loading referenced content...</span></div>"#,
            html_escape(&normalize_slug(slug)),
            html_escape(id)
        ))),
        None => Event::InlineHtml(CowStr::from(format!(
            r#"<span class="{REF_ERROR_CLASS}">[Invalid Ref: {}]</span>"#,
            html_escape(&format!("{REF_OPEN}{inner}{REF_CLOSE}"))
        ))),
    }
}

/// Move block placeholders out of their paragraphs.
///
/// A `<div>` cannot sit inside `<p>`, so the paragraph is closed before the
/// placeholder and reopened after it. Pieces left with only whitespace or
/// line breaks are dropped. Placeholders nested in inline markup stay put.
fn lift_block_placeholders(events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    let mut result = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        if !matches!(event, Event::Start(Tag::Paragraph)) {
            result.push(event);
            continue;
        }

        let mut piece = Vec::new();
        let mut depth = 0usize;
        for inner in iter.by_ref() {
            match inner {
                Event::End(TagEnd::Paragraph) if depth == 0 => break,
                Event::Html(html) if depth == 0 => {
                    push_paragraph(&mut result, std::mem::take(&mut piece));
                    result.push(Event::Html(CowStr::from(format!("{html}\n"))));
                }
                other => {
                    match &other {
                        Event::Start(_) => depth += 1,
                        Event::End(_) => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    piece.push(other);
                }
            }
        }
        push_paragraph(&mut result, piece);
    }

    result
}

fn push_paragraph(out: &mut Vec<Event<'static>>, mut body: Vec<Event<'static>>) {
    let is_blank = |e: &Event| match e {
        Event::Text(t) => t.trim().is_empty(),
        Event::SoftBreak | Event::HardBreak => true,
        _ => false,
    };

    while body.first().is_some_and(is_blank) {
        body.remove(0);
    }
    while body.last().is_some_and(is_blank) {
        body.pop();
    }
    if body.is_empty() {
        return;
    }

    out.push(Event::Start(Tag::Paragraph));
    out.extend(body);
    out.push(Event::End(TagEnd::Paragraph));
}

//! Code syntax highlighting using syntect.

use super::html_escape;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Theme used when the configured one is not bundled with syntect
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Transformer for syntax highlighting fenced code blocks
///
/// Owns its syntax and theme sets, so build one per run and reuse it.
pub struct HighlightTransformer {
    syntax_set: SyntaxSet,
    theme: Option<Theme>,
}

impl HighlightTransformer {
    pub fn new(theme_name: &str) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .remove(theme_name)
            .or_else(|| theme_set.themes.remove(DEFAULT_THEME))
            .or_else(|| theme_set.themes.into_values().next());

        if theme.is_none() {
            tracing::warn!("No highlighting theme available; code blocks render plain");
        }

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Transform events, adding syntax highlighting to fenced code blocks
    pub fn transform(&self, events: Vec<Event<'static>>) -> Vec<Event<'static>> {
        let mut result = Vec::with_capacity(events.len());
        let mut code_lang: Option<String> = None;
        let mut code_content = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                    code_lang = Some(lang.to_string());
                    code_content.clear();
                }
                Event::Text(text) if code_lang.is_some() => {
                    code_content.push_str(&text);
                }
                Event::End(TagEnd::CodeBlock) if code_lang.is_some() => {
                    let lang = code_lang.take().unwrap_or_default();
                    let html = self.highlight_code(&code_content, lang.trim());
                    result.push(Event::Html(CowStr::from(html)));
                }
                other => result.push(other),
            }
        }

        result
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let plain = || format!("<pre><code>{}</code></pre>\n", html_escape(code));

        let Some(theme) = self.theme.as_ref().filter(|_| !lang.is_empty()) else {
            return plain();
        };

        let ss = &self.syntax_set;
        let syntax = ss
            .find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_extension(lang))
            .unwrap_or_else(|| ss.find_syntax_plain_text());

        match highlighted_html_for_string(code, ss, syntax, theme) {
            Ok(html) => html,
            Err(err) => {
                tracing::debug!("Highlighting failed for {}: {}", lang, err);
                plain()
            }
        }
    }
}

impl Default for HighlightTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

//! Slug generation, page slug derivation, and display titles.

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUNS: OnceLock<Regex> = OnceLock::new();

/// Convert a string to a URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Replace whitespace with hyphens
/// - Remove special characters (except hyphens)
/// - Collapse multiple hyphens
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use hashbook_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Rust & Safety"), "rust-safety");
/// assert_eq!(slugify("C++ Programming"), "c-programming");
/// ```
pub fn slugify(input: &str) -> String {
    let lowercased = input.to_lowercase();

    let cleaned = lowercased
        .graphemes(true)
        .filter_map(|g| match g {
            " " | "_" | "\t" | "\n" => Some("-"),
            _ => {
                let c = g.chars().next()?;
                (c.is_alphanumeric() || c == '-').then_some(g)
            }
        })
        .collect::<String>();

    let re = HYPHEN_RUNS.get_or_init(|| Regex::new(r"-+").expect("hyphen regex is valid"));
    let collapsed = re.replace_all(&cleaned, "-");

    collapsed.trim_matches('-').to_string()
}

/// Derive the page slug for a document path relative to the input root.
///
/// `rel_path` uses `/` separators and still carries the `.md` extension.
///
/// ```
/// use hashbook_core::slug::page_slug;
///
/// assert_eq!(page_slug("index.md"), "/");
/// assert_eq!(page_slug("guide/index.md"), "/guide");
/// assert_eq!(page_slug("guide/intro.md"), "/guide/intro");
/// ```
pub fn page_slug(rel_path: &str) -> String {
    let stem_path = rel_path.strip_suffix(".md").unwrap_or(rel_path);
    let (dir, stem) = stem_path.rsplit_once('/').unwrap_or(("", stem_path));

    match (dir.is_empty(), stem == "index") {
        (true, true) => "/".to_string(),
        (false, true) => format!("/{dir}"),
        (true, false) => format!("/{stem}"),
        (false, false) => format!("/{dir}/{stem}"),
    }
}

/// Path segments used to place a document in the navigation tree.
pub fn path_segments(rel_path: &str) -> Vec<String> {
    rel_path
        .strip_suffix(".md")
        .unwrap_or(rel_path)
        .split('/')
        .map(str::to_string)
        .collect()
}

/// Human-readable title for a file stem or directory segment.
///
/// ```
/// use hashbook_core::slug::display_title;
///
/// assert_eq!(display_title("getting-started"), "Getting Started");
/// ```
pub fn display_title(segment: &str) -> String {
    title_case(&segment.replace('-', " "))
}

/// Uppercase the first letter of every word.
///
/// A word starts at the beginning of the input or after any character
/// that is not a letter, digit, or underscore. Other characters are kept.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;

    for c in input.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }

    out
}

//! Frontmatter parsing from markdown files.

use crate::models::{MetaValue, Metadata};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter must be a mapping of keys to values")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z")
            .expect("frontmatter regex is valid")
    })
}

/// Parse frontmatter from markdown content
///
/// Returns a tuple of (metadata, markdown_body).
/// If no frontmatter is present, returns empty metadata with the full content as body.
///
/// # Example
///
/// ```
/// use hashbook_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: My Post\nweight: 2\n---\n# Hello World\n";
///
/// let (meta, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(meta.title(), "My Post");
/// assert_eq!(meta.weight(), 2);
/// assert!(body.starts_with("# Hello World"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Metadata, &str), FrontmatterError> {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((Metadata::new(), content));
    };

    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    let value: serde_yaml::Value = if yaml.trim().is_empty() {
        serde_yaml::Value::Null
    } else {
        serde_yaml::from_str(yaml)?
    };

    let mut metadata = Metadata::new();
    match value {
        serde_yaml::Value::Null => {}
        serde_yaml::Value::Mapping(mapping) => {
            for (key, value) in &mapping {
                let key = MetaValue::from_yaml(key).as_string();
                metadata.insert(key, MetaValue::from_yaml(value));
            }
        }
        _ => return Err(FrontmatterError::NotAMapping),
    }

    Ok((metadata, body))
}

//! Content model structs for pages, navigation, and the site payload.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A loosely-typed front matter value with explicit coercion rules.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MetaValue {
    String(String),
    Integer(i64),
    Float(f64),
    #[default]
    Missing,
}

static MISSING: MetaValue = MetaValue::Missing;

impl MetaValue {
    /// Convert a YAML scalar into a metadata value.
    ///
    /// Booleans become strings, and sequences/mappings are kept as their
    /// compact YAML text so unknown keys survive without a richer type.
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => MetaValue::Missing,
            Value::Bool(b) => MetaValue::String(b.to_string()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MetaValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    MetaValue::Integer(i64::try_from(u).unwrap_or(i64::MAX))
                } else {
                    n.as_f64().map(MetaValue::Float).unwrap_or_default()
                }
            }
            Value::String(s) => MetaValue::String(s.clone()),
            Value::Sequence(_) | Value::Mapping(_) => serde_yaml::to_string(value)
                .map(|s| MetaValue::String(s.trim_end().to_string()))
                .unwrap_or_default(),
            Value::Tagged(tagged) => MetaValue::from_yaml(&tagged.value),
        }
    }

    /// String coercion: numbers render as decimals, missing is empty.
    pub fn as_string(&self) -> String {
        match self {
            MetaValue::String(s) => s.clone(),
            MetaValue::Integer(i) => i.to_string(),
            MetaValue::Float(f) => f.to_string(),
            MetaValue::Missing => String::new(),
        }
    }

    /// Integer coercion: floats truncate toward zero, everything else is 0.
    pub fn as_int(&self) -> i64 {
        match self {
            MetaValue::Integer(i) => *i,
            MetaValue::Float(f) => f.trunc() as i64,
            MetaValue::String(_) | MetaValue::Missing => 0,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, MetaValue::Missing)
    }
}

/// Front matter key/value pairs for one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    values: HashMap<String, MetaValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.values.insert(key.into(), value);
    }

    /// Look up a key, yielding [`MetaValue::Missing`] when absent.
    pub fn get(&self, key: &str) -> &MetaValue {
        self.values.get(key).unwrap_or(&MISSING)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn title(&self) -> String {
        self.get("title").as_string()
    }

    pub fn published(&self) -> String {
        self.get("published on").as_string()
    }

    pub fn updated(&self) -> String {
        self.get("updated on").as_string()
    }

    pub fn category(&self) -> String {
        self.get("category").as_string()
    }

    pub fn description(&self) -> String {
        self.get("description").as_string()
    }

    pub fn weight(&self) -> i64 {
        self.get("weight").as_int()
    }
}

/// A heading entry in a page's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub id: String,
    pub level: u32,
}

/// A single rendered page, keyed by slug in [`Site::pages`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,

    /// Rendered HTML content
    pub content: String,

    pub toc: Vec<TocEntry>,
    pub published: String,
    pub updated: String,
    pub category: String,
    pub description: String,
    pub weight: i64,
}

/// A node in the navigation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub title: String,

    /// Target page slug; empty for folders
    pub slug: String,

    pub is_folder: bool,
    pub weight: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,

    /// Literal path segment this node was created from
    #[serde(skip)]
    pub key: String,
}

impl MenuItem {
    /// Synthetic grouping node for a directory segment
    pub fn folder(key: &str, title: String) -> Self {
        Self {
            title,
            slug: String::new(),
            is_folder: true,
            weight: 0,
            children: Vec::new(),
            key: key.to_string(),
        }
    }

    /// Leaf node pointing at a page
    pub fn leaf(key: &str, slug: &str, title: &str, weight: i64) -> Self {
        Self {
            title: title.to_string(),
            slug: slug.to_string(),
            is_folder: false,
            weight,
            children: Vec::new(),
            key: key.to_string(),
        }
    }
}

/// The payload handed to the application shell as `db.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub pages: BTreeMap<String, Page>,
    pub menu: Vec<MenuItem>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Serialize to the compact JSON written as `db.json`
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Diagnostic emitted while verifying a built site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub page_slug: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

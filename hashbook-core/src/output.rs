//! Writing build artifacts to the output directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DB_FILE: &str = "db.json";
pub const INDEX_FILE: &str = "index.html";
pub const SITEMAP_FILE: &str = "sitemap.xml";

#[derive(Error, Debug)]
pub enum OutputError {
    #[error(
        "Refusing to clear {}: it contains the input directory {}",
        output.display(),
        input.display()
    )]
    ContainsInput { output: PathBuf, input: PathBuf },

    #[error("Failed to clear output directory {}: {source}", path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The three files a build publishes
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub db_json: String,
    pub index_html: String,
    pub sitemap_xml: String,
}

/// Replace the output directory with a fresh copy holding `artifacts`.
///
/// Previous contents are removed first, unless that would delete
/// `input_dir`. Each file is written to a temporary file inside the
/// directory and renamed into place.
pub fn write_output(dir: &Path, input_dir: &Path, artifacts: &Artifacts) -> Result<(), OutputError> {
    if dir.exists() {
        ensure_disjoint(dir, input_dir)?;
        fs::remove_dir_all(dir).map_err(|source| OutputError::Clear {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::create_dir_all(dir).map_err(|source| OutputError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    for (name, contents) in [
        (DB_FILE, &artifacts.db_json),
        (INDEX_FILE, &artifacts.index_html),
        (SITEMAP_FILE, &artifacts.sitemap_xml),
    ] {
        let path = dir.join(name);
        write_atomic(&path, contents.as_bytes())
            .map_err(|source| OutputError::Write { path: path.clone(), source })?;
        tracing::debug!("Wrote {}", path.display());
    }

    tracing::info!("Wrote output to {}", dir.display());
    Ok(())
}

/// Fail when `output` is `input` or one of its ancestors.
fn ensure_disjoint(output: &Path, input: &Path) -> Result<(), OutputError> {
    let canonical_output = fs::canonicalize(output).map_err(|source| OutputError::Clear {
        path: output.to_path_buf(),
        source,
    })?;
    // An input that cannot be resolved does not exist, so nothing can be lost
    let Ok(canonical_input) = fs::canonicalize(input) else {
        return Ok(());
    };

    if canonical_input.starts_with(&canonical_output) {
        return Err(OutputError::ContainsInput {
            output: output.to_path_buf(),
            input: input.to_path_buf(),
        });
    }
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn artifacts() -> Artifacts {
        Artifacts {
            db_json: "{}".into(),
            index_html: "<html></html>".into(),
            sitemap_xml: "<urlset/>".into(),
        }
    }

    #[test]
    fn test_writes_all_files() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("public");
        write_output(&out, &dir.path().join("content"), &artifacts()).unwrap();

        assert_eq!(fs::read_to_string(out.join(DB_FILE)).unwrap(), "{}");
        assert_eq!(fs::read_to_string(out.join(INDEX_FILE)).unwrap(), "<html></html>");
        assert_eq!(fs::read_to_string(out.join(SITEMAP_FILE)).unwrap(), "<urlset/>");
        assert_eq!(fs::read_dir(&out).unwrap().count(), 3);
    }

    #[test]
    fn test_refuses_to_clear_input_dir() {
        let dir = tempdir().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(&content).unwrap();
        fs::write(content.join("index.md"), "Home").unwrap();

        let err = write_output(&content, &content, &artifacts()).unwrap_err();
        assert!(matches!(err, OutputError::ContainsInput { .. }));

        let err = write_output(dir.path(), &content, &artifacts()).unwrap_err();
        assert!(matches!(err, OutputError::ContainsInput { .. }));

        assert_eq!(fs::read_to_string(content.join("index.md")).unwrap(), "Home");
        assert!(!content.join(DB_FILE).exists());
    }

    #[test]
    fn test_output_inside_input_is_allowed() {
        let dir = tempdir().unwrap();
        let content = dir.path().join("content");
        let out = content.join("public");
        fs::create_dir_all(&out).unwrap();
        fs::write(content.join("index.md"), "Home").unwrap();

        write_output(&out, &content, &artifacts()).unwrap();
        assert!(content.join("index.md").exists());
        assert!(out.join(DB_FILE).exists());
    }

    #[test]
    fn test_previous_contents_removed() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("public");
        fs::create_dir_all(out.join("stale")).unwrap();
        fs::write(out.join("old.html"), "old").unwrap();

        write_output(&out, &dir.path().join("content"), &artifacts()).unwrap();

        assert!(!out.join("old.html").exists());
        assert!(!out.join("stale").exists());
        assert!(out.join(DB_FILE).exists());
    }
}

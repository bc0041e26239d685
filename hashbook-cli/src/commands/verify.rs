//! Verify internal links and transclusions and emit diagnostics.

use super::build::{load_config, BuildOverrides};
use anyhow::{Context, Result};
use hashbook_core::{Diagnostic, DiagnosticSeverity, SiteBuilder};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct VerificationSummary<'a> {
    pages: usize,
    errors: usize,
    warnings: usize,
    diagnostics: &'a [Diagnostic],
}

/// Build the site in memory and report problems without writing output.
pub fn verify_site(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path, BuildOverrides::default())?;
    let output = SiteBuilder::new(config)
        .build()
        .context("Failed to build site for verification")?;

    let diagnostics = hashbook_core::verify_site(&output.site);
    let count = |severity: DiagnosticSeverity| {
        diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    };

    let summary = VerificationSummary {
        pages: output.site.pages.len(),
        errors: count(DiagnosticSeverity::Error),
        warnings: count(DiagnosticSeverity::Warning),
        diagnostics: &diagnostics,
    };

    if json {
        let payload = serde_json::to_string_pretty(&summary)?;
        println!("{}", payload);
    } else {
        println!(
            "Verification complete: {} pages, {} errors, {} warnings",
            summary.pages, summary.errors, summary.warnings
        );
        for diag in &diagnostics {
            let slug = diag
                .page_slug
                .as_deref()
                .map(|s| format!(" [{}]", s))
                .unwrap_or_default();
            println!("- {:?} {}{}: {}", diag.severity, diag.code, slug, diag.message);
            if let Some(ctx) = &diag.context {
                println!("  context: {}", ctx);
            }
        }
    }

    Ok(())
}

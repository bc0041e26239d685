//! Site verification: broken internal links and unresolvable transclusions.

use crate::markdown::directives::normalize_slug;
use crate::models::{Diagnostic, DiagnosticSeverity, Site};
use crate::transclude::{find_invalid_refs, find_links, find_references, resolve_section};

pub const LINK_BROKEN: &str = "link.broken";
pub const REF_UNRESOLVED: &str = "ref.unresolved";
pub const REF_INVALID: &str = "ref.invalid";

/// Check every page of a built site. Pages are visited in slug order.
pub fn verify_site(site: &Site) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (slug, page) in &site.pages {
        for target in find_links(&page.content) {
            if !site.pages.contains_key(&normalize_slug(&target)) {
                diagnostics.push(diagnostic(
                    DiagnosticSeverity::Warning,
                    LINK_BROKEN,
                    format!("Link to missing page {target}"),
                    slug,
                    format!("[[{}]]", target.trim_start_matches('/')),
                ));
            }
        }

        for (ref_slug, id) in find_references(&page.content) {
            if let Err(err) = resolve_section(&site.pages, &ref_slug, &id) {
                diagnostics.push(diagnostic(
                    DiagnosticSeverity::Warning,
                    REF_UNRESOLVED,
                    err.to_string(),
                    slug,
                    format!("{{{{ref:{}#{id}}}}}", ref_slug.trim_start_matches('/')),
                ));
            }
        }

        for marker in find_invalid_refs(&page.content) {
            diagnostics.push(diagnostic(
                DiagnosticSeverity::Error,
                REF_INVALID,
                "Reference must have the form {{ref:slug#id}}".to_string(),
                slug,
                marker,
            ));
        }
    }

    tracing::debug!("Verification produced {} diagnostics", diagnostics.len());
    diagnostics
}

/// A malformed `{{ref:...}}` is an authoring error; missing targets are warnings.
fn diagnostic(
    severity: DiagnosticSeverity,
    code: &str,
    message: String,
    slug: &str,
    context: String,
) -> Diagnostic {
    Diagnostic {
        code: code.to_string(),
        message,
        severity,
        page_slug: Some(slug.to_string()),
        context: Some(context),
    }
}

//! Sitemap generation.
//!
//! Pages live behind a hash router, so every location except the home page
//! carries the slug as a `#` fragment:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!     <changefreq>weekly</changefreq>
//!   </url>
//! </urlset>
//! ```

use chrono::NaiveDate;

/// XML namespace for sitemap
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const CHANGE_FREQUENCY: &str = "weekly";

/// Absolute location of a page under the hash router.
pub fn page_location(base_url: &str, slug: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if slug == "/" {
        format!("{base}/")
    } else {
        format!("{base}/#{slug}")
    }
}

/// Render the sitemap for `slugs`, keeping their order.
pub fn render_sitemap(base_url: &str, slugs: &[String], today: NaiveDate) -> String {
    let lastmod = today.format("%Y-%m-%d").to_string();

    let mut xml = String::with_capacity(128 + slugs.len() * 128);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{SITEMAP_NS}\">\n"));

    for slug in slugs {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape_xml(&page_location(base_url, slug))
        ));
        xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
        xml.push_str(&format!("    <changefreq>{CHANGE_FREQUENCY}</changefreq>\n"));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn slugs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_page_location() {
        assert_eq!(page_location("https://mysite.com", "/"), "https://mysite.com/");
        assert_eq!(
            page_location("https://mysite.com/", "/guide/intro"),
            "https://mysite.com/#/guide/intro"
        );
    }

    #[test]
    fn test_sitemap_snapshot() {
        let xml = render_sitemap("https://mysite.com", &slugs(&["/", "/guide/intro"]), date());
        insta::assert_snapshot!(xml, @r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://mysite.com/</loc>
            <lastmod>2025-03-14</lastmod>
            <changefreq>weekly</changefreq>
          </url>
          <url>
            <loc>https://mysite.com/#/guide/intro</loc>
            <lastmod>2025-03-14</lastmod>
            <changefreq>weekly</changefreq>
          </url>
        </urlset>
        "#);
    }

    #[test]
    fn test_entry_count_and_fragments() {
        let input = slugs(&["/b", "/", "/a/c", "/b"]);
        let xml = render_sitemap("https://mysite.com", &input, date());

        let locs: Vec<&str> = xml
            .lines()
            .filter_map(|l| l.trim().strip_prefix("<loc>"))
            .filter_map(|l| l.strip_suffix("</loc>"))
            .collect();

        assert_eq!(locs.len(), input.len());
        assert_eq!(
            locs,
            vec![
                "https://mysite.com/#/b",
                "https://mysite.com/",
                "https://mysite.com/#/a/c",
                "https://mysite.com/#/b",
            ]
        );
        assert_eq!(locs.iter().filter(|l| !l.contains('#')).count(), 1);
    }

    #[test]
    fn test_locations_escaped() {
        let xml = render_sitemap("https://mysite.com", &slugs(&["/q&a"]), date());
        assert!(xml.contains("<loc>https://mysite.com/#/q&amp;a</loc>"));
    }

    #[test]
    fn test_empty_sitemap() {
        let xml = render_sitemap("https://mysite.com", &[], date());
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }
}

//! Extract `<script src="...">` URLs from a page.
//!
//! Parses with `scraper`, so broken markup degrades into fewer matches
//! instead of an error. Document order is kept and nothing is filtered or
//! deduplicated: the snapshot records exactly what the page references.

use scraper::{Html, Selector};

/// Every `<script>` `src` in `html`, in document order, made absolute.
pub fn extract_script_urls(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(sel) = Selector::parse("script[src]") else {
        return Vec::new();
    };

    document
        .select(&sel)
        .filter_map(|el| el.value().attr("src"))
        .map(|src| resolve_script_url(src, base_url))
        .collect()
}

/// Resolve a script `src` attribute value against a base URL.
///
/// Plain string prefixing rather than RFC 3986 resolution: a base with a
/// path keeps that path, and relative sources never climb out of it.
pub fn resolve_script_url(src: &str, base_url: &str) -> String {
    // Protocol-relative
    if let Some(rest) = src.strip_prefix("//") {
        return format!("https://{rest}");
    }

    // Already absolute
    if src.starts_with("http") {
        return src.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if src.starts_with('/') {
        format!("{base}{src}")
    } else {
        format!("{base}/{src}")
    }
}

//! HTML text and link extraction for the scrape verifier.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

static LEADERSHIP_LINK_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"about|team|leadership|people|management|company|executive|board")
        .expect("valid link text regex")
});

/// Text content of the document, skipping script and style bodies.
/// Text nodes are joined with single spaces.
pub(crate) fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    for node in document.root_element().descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name().to_string()))
                .is_some_and(|tag| matches!(tag.as_str(), "script" | "style" | "noscript"));
            if !hidden {
                out.push_str(text);
                out.push(' ');
            }
        }
    }
    out
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Same-host links whose anchor text suggests an about/team/leadership page,
/// resolved against `page_url`, de-duplicated in document order and capped at
/// `limit`.
pub(crate) fn extract_leadership_links(page_url: &str, html: &str, limit: usize) -> Vec<String> {
    let base = match Url::parse(page_url) {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!(target: "scrape_task", "Cannot mine links, bad page URL '{}': {}", page_url, e);
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in document.select(&ANCHOR_SELECTOR) {
        let href = anchor.value().attr("href").unwrap_or("").trim();
        if href.is_empty() {
            continue;
        }
        let text = anchor.text().collect::<String>().trim().to_lowercase();
        if !LEADERSHIP_LINK_TEXT.is_match(&text) {
            continue;
        }
        let Ok(target) = base.join(href) else {
            continue;
        };
        if !same_origin(&base, &target) {
            continue;
        }
        let target = target.to_string();
        if seen.insert(target.clone()) {
            links.push(target);
        }
        if links.len() >= limit {
            break;
        }
    }
    links
}

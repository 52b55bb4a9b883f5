//! Candidate extraction from the rendered results page
//!
//! Walks the result grid in document order and produces at most `limit`
//! unique candidates. Result anchors carry the full-resolution URL in
//! their `imgres` href; grid thumbnails stand in for results that have no
//! usable anchor.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::session::RenderedPage;

mod normalize;

/// One downloadable image reference, in grid order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    /// Direct URL of the image bytes
    pub source_url: Url,
    /// Page the image was found on, sent as the fetch referer
    pub referring_page_url: Option<Url>,
    /// 1-based position in the result grid
    pub ordinal_rank: usize,
}

// Parsed once at first access and cached forever. Hardcoded selectors
// never fail to parse; if one does it is a bug in the literal.
static CANDIDATE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href*='imgres'], img.rg_i")
        .expect("BUG: hardcoded candidate selector is invalid")
});

static ANCHOR_IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("BUG: hardcoded img selector is invalid"));

/// Extract up to `limit` unique candidates from a rendered results page.
///
/// Candidates keep the grid's document order; `ordinal_rank` is assigned
/// after deduplication, so ranks are contiguous from 1. A page yielding
/// fewer than `limit` results simply produces a shorter list.
#[must_use]
pub fn extract(page: &RenderedPage, limit: usize) -> Vec<ImageCandidate> {
    let document = Html::parse_document(page.html());
    let base = page.url();

    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for element in document.select(&CANDIDATE_SELECTOR) {
        if out.len() >= limit {
            break;
        }

        let candidate = match element.value().name() {
            "a" => anchor_candidate(element, base),
            "img" => thumbnail_candidate(element, base),
            _ => None,
        };

        let Some((source_url, referring_page_url)) = candidate else {
            continue;
        };

        if !seen.insert(normalize::dedup_key(&source_url)) {
            continue;
        }

        out.push(ImageCandidate {
            source_url,
            referring_page_url,
            ordinal_rank: out.len() + 1,
        });
    }

    debug!("Extracted {} candidates from results page", out.len());
    out
}

/// Candidate from a result anchor.
///
/// Prefers the full-resolution `imgurl` parameter; an anchor without one
/// falls back to the thumbnail it wraps.
fn anchor_candidate(element: ElementRef<'_>, base: &Url) -> Option<(Url, Option<Url>)> {
    let href = element.value().attr("href")?;
    if let Some(parsed) = normalize::from_result_href(href, base) {
        return Some(parsed);
    }

    element
        .select(&ANCHOR_IMG_SELECTOR)
        .next()
        .and_then(|img| thumbnail_src(img, base))
        .map(|url| (url, None))
}

/// Candidate from a bare grid thumbnail.
///
/// Thumbnails inside a result anchor are skipped: the anchor pass already
/// handled that result, with or without a full-resolution URL.
fn thumbnail_candidate(element: ElementRef<'_>, base: &Url) -> Option<(Url, Option<Url>)> {
    if inside_result_anchor(element) {
        return None;
    }
    thumbnail_src(element, base).map(|url| (url, None))
}

/// First fetchable URL among the thumbnail's source attributes.
///
/// Lazy-loaded grids keep a placeholder in `src` and the real URL in
/// `data-src`; placeholders are data URIs, which the normalizer rejects.
fn thumbnail_src(element: ElementRef<'_>, base: &Url) -> Option<Url> {
    ["src", "data-src"]
        .into_iter()
        .filter_map(|attr| element.value().attr(attr))
        .find_map(|raw| normalize::parse_candidate(raw, base))
}

fn inside_result_anchor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            ancestor.value().name() == "a"
                && ancestor
                    .value()
                    .attr("href")
                    .is_some_and(|href| href.contains("imgres"))
        })
}

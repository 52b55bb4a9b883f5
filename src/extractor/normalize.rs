//! URL normalization for extracted candidates

use url::Url;

/// Parse a raw attribute value into an absolute fetchable URL.
///
/// Relative references resolve against the page URL. Anything that is
/// not http(s) after resolution (data URIs, javascript:, mailto:) is
/// discarded. Fragments never reach the server, so they are stripped
/// before the URL participates in deduplication.
pub(crate) fn parse_candidate(raw: &str, base: &Url) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut url = base.join(trimmed).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Pull the full-resolution image URL and referring page out of a result
/// anchor's `imgres` href.
///
/// The interesting parts live in the `imgurl` and `imgrefurl` query
/// parameters; `query_pairs()` hands them over percent-decoded.
pub(crate) fn from_result_href(href: &str, base: &Url) -> Option<(Url, Option<Url>)> {
    let resolved = base.join(href.trim()).ok()?;

    let mut image = None;
    let mut referrer = None;
    for (key, value) in resolved.query_pairs() {
        match key.as_ref() {
            "imgurl" if image.is_none() => image = parse_candidate(&value, base),
            "imgrefurl" if referrer.is_none() => referrer = parse_candidate(&value, base),
            _ => {}
        }
    }

    image.map(|url| (url, referrer))
}

/// Key under which a candidate URL is deduplicated.
///
/// Normalization already happened in [`parse_candidate`], so the
/// serialized form is stable: same image, same key.
pub(crate) fn dedup_key(url: &Url) -> String {
    url.as_str().to_string()
}

//! Destination filename derivation
//!
//! Files are named `{prefix}_{rank:04}_{stem}.{ext}`. The zero-padded
//! rank keeps directory listings in result order; the stem is whatever
//! printable name the source URL offers, or nothing.

use url::Url;

use crate::extractor::ImageCandidate;

/// Longest stem kept from the source URL
const MAX_STEM_LEN: usize = 64;

/// Filename for a candidate, with `attempt` appended as a collision
/// disambiguator when above zero.
pub(crate) fn destination_name(
    candidate: &ImageCandidate,
    prefix: &str,
    extension: &str,
    attempt: u32,
) -> String {
    let prefix_part = if prefix.is_empty() {
        String::new()
    } else {
        format!("{prefix}_")
    };
    let stem_part = url_stem(&candidate.source_url)
        .map(|stem| format!("_{stem}"))
        .unwrap_or_default();
    let attempt_part = if attempt == 0 {
        String::new()
    } else {
        format!("_{attempt}")
    };

    format!(
        "{prefix_part}{rank:04}{stem_part}{attempt_part}.{extension}",
        rank = candidate.ordinal_rank
    )
}

/// Printable stem from the URL's last non-empty path segment.
///
/// The segment is percent-decoded, stripped of its claimed extension
/// (which is never trusted), sanitized for the filesystem, and truncated.
/// Returns `None` when nothing printable survives; the rank alone then
/// names the file.
fn url_stem(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).next_back()?;

    let decoded = urlencoding::decode(segment).ok()?;
    let without_ext = decoded
        .rsplit_once('.')
        .map_or(decoded.as_ref(), |(stem, _)| stem);

    let sanitized = sanitize_filename::sanitize(without_ext);
    let truncated: String = sanitized.chars().take(MAX_STEM_LEN).collect();
    let trimmed = truncated.trim_matches(['.', ' ', '_']).to_string();

    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, rank: usize) -> ImageCandidate {
        ImageCandidate {
            source_url: Url::parse(url).unwrap(),
            referring_page_url: None,
            ordinal_rank: rank,
        }
    }

    #[test]
    fn name_carries_prefix_rank_and_stem() {
        let c = candidate("https://cdn.example/photos/red-panda.jpeg", 3);
        assert_eq!(destination_name(&c, "img", "jpg", 0), "img_0003_red-panda.jpg");
    }

    #[test]
    fn rank_alone_when_url_has_no_usable_segment() {
        let c = candidate("https://cdn.example/", 12);
        assert_eq!(destination_name(&c, "img", "png", 0), "img_0012.png");
    }

    #[test]
    fn claimed_extension_is_dropped_from_stem() {
        // The .png in the URL does not survive; the validated extension does.
        let c = candidate("https://cdn.example/banner.png", 1);
        assert_eq!(destination_name(&c, "img", "gif", 0), "img_0001_banner.gif");
    }

    #[test]
    fn disambiguator_precedes_the_extension() {
        let c = candidate("https://cdn.example/a.jpg", 2);
        assert_eq!(destination_name(&c, "img", "jpg", 1), "img_0002_a_1.jpg");
        assert_eq!(destination_name(&c, "img", "jpg", 9), "img_0002_a_9.jpg");
    }

    #[test]
    fn empty_prefix_is_skipped() {
        let c = candidate("https://cdn.example/a.jpg", 7);
        assert_eq!(destination_name(&c, "", "jpg", 0), "0007_a.jpg");
    }

    #[test]
    fn percent_encoded_segments_are_decoded() {
        let c = candidate("https://cdn.example/red%20panda%20cub.jpg", 5);
        let name = destination_name(&c, "img", "jpg", 0);
        assert_eq!(name, "img_0005_red panda cub.jpg");
    }

    #[test]
    fn path_traversal_cannot_escape_the_directory() {
        let c = candidate("https://evil.example/%2e%2e%2f%2e%2e%2fetc%2fpasswd", 1);
        let name = destination_name(&c, "img", "jpg", 0);
        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
        assert!(!name.starts_with('.'));
    }

    #[test]
    fn overlong_segments_are_truncated() {
        let long = "a".repeat(500);
        let c = candidate(&format!("https://cdn.example/{long}.jpg"), 1);
        let name = destination_name(&c, "img", "jpg", 0);
        assert!(name.len() <= "img_0001_".len() + MAX_STEM_LEN + ".jpg".len());
    }
}

//! Extraction tests against fixture results pages

use iget::extractor::extract;

mod common;
use common::{rendered_page, results_page_html, ResultEntry};

#[test]
fn test_full_resolution_candidate_with_referrer() {
    let html = results_page_html(&[ResultEntry::Full {
        image: "https://cdn.example/photos/red-panda.jpg",
        referrer: "https://blog.example/red-pandas",
        thumb: "https://encrypted-tbn0.example/thumb1",
    }]);

    let candidates = extract(&rendered_page(html), 10);

    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].source_url.as_str(),
        "https://cdn.example/photos/red-panda.jpg"
    );
    assert_eq!(
        candidates[0].referring_page_url.as_ref().unwrap().as_str(),
        "https://blog.example/red-pandas"
    );
    assert_eq!(candidates[0].ordinal_rank, 1);
}

#[test]
fn test_limit_caps_extraction_in_document_order() {
    let images: Vec<String> = (1..=8)
        .map(|i| format!("https://cdn.example/photo-{i}.jpg"))
        .collect();
    let entries: Vec<ResultEntry<'_>> = images
        .iter()
        .map(|image| ResultEntry::Full {
            image,
            referrer: "https://blog.example/post",
            thumb: "https://encrypted-tbn0.example/t",
        })
        .collect();

    let candidates = extract(&rendered_page(results_page_html(&entries)), 5);

    assert_eq!(candidates.len(), 5);
    for (i, candidate) in candidates.iter().enumerate() {
        assert_eq!(candidate.source_url.as_str(), images[i]);
        assert_eq!(candidate.ordinal_rank, i + 1);
    }
}

#[test]
fn test_page_with_fewer_results_than_limit() {
    let entries = [
        ResultEntry::Full {
            image: "https://cdn.example/a.jpg",
            referrer: "https://a.example/",
            thumb: "https://tbn.example/a",
        },
        ResultEntry::Full {
            image: "https://cdn.example/b.jpg",
            referrer: "https://b.example/",
            thumb: "https://tbn.example/b",
        },
    ];

    let candidates = extract(&rendered_page(results_page_html(&entries)), 10);
    assert_eq!(candidates.len(), 2);
}

#[test]
fn test_duplicate_urls_collapse_with_contiguous_ranks() {
    let entries = [
        ResultEntry::Full {
            image: "https://cdn.example/a.jpg",
            referrer: "https://one.example/",
            thumb: "https://tbn.example/1",
        },
        ResultEntry::Full {
            image: "https://cdn.example/b.jpg",
            referrer: "https://two.example/",
            thumb: "https://tbn.example/2",
        },
        // Same image again from a different page
        ResultEntry::Full {
            image: "https://cdn.example/a.jpg",
            referrer: "https://three.example/",
            thumb: "https://tbn.example/3",
        },
        ResultEntry::Full {
            image: "https://cdn.example/c.jpg",
            referrer: "https://four.example/",
            thumb: "https://tbn.example/4",
        },
    ];

    let candidates = extract(&rendered_page(results_page_html(&entries)), 10);

    let urls: Vec<&str> = candidates.iter().map(|c| c.source_url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://cdn.example/a.jpg",
            "https://cdn.example/b.jpg",
            "https://cdn.example/c.jpg"
        ]
    );
    let ranks: Vec<usize> = candidates.iter().map(|c| c.ordinal_rank).collect();
    assert_eq!(ranks, [1, 2, 3]);
}

#[test]
fn test_bare_thumbnail_stands_in_without_referrer() {
    let html = results_page_html(&[ResultEntry::ThumbOnly {
        thumb: "https://encrypted-tbn0.example/images?q=tbn:abc",
    }]);

    let candidates = extract(&rendered_page(html), 10);

    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].source_url.as_str(),
        "https://encrypted-tbn0.example/images?q=tbn:abc"
    );
    assert!(candidates[0].referring_page_url.is_none());
}

#[test]
fn test_anchor_without_image_url_falls_back_to_its_thumbnail() {
    let html = results_page_html(&[ResultEntry::AnchorWithoutImageUrl {
        thumb: "https://encrypted-tbn0.example/images?q=tbn:xyz",
    }]);

    let candidates = extract(&rendered_page(html), 10);

    // One candidate, not two: the thumbnail inside the anchor must not
    // be counted again by the thumbnail pass.
    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].source_url.as_str(),
        "https://encrypted-tbn0.example/images?q=tbn:xyz"
    );
    assert!(candidates[0].referring_page_url.is_none());
}

#[test]
fn test_data_uri_thumbnails_are_skipped() {
    let html = results_page_html(&[
        ResultEntry::ThumbOnly {
            thumb: "data:image/gif;base64,R0lGODlhAQABAAAAACw=",
        },
        ResultEntry::ThumbOnly {
            thumb: "https://encrypted-tbn0.example/real",
        },
    ]);

    let candidates = extract(&rendered_page(html), 10);

    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].source_url.as_str(),
        "https://encrypted-tbn0.example/real"
    );
}

#[test]
fn test_lazy_loaded_thumbnail_uses_data_src() {
    let html = "<html><body>\
         <img class=\"rg_i\" src=\"data:image/gif;base64,R0lGODlh\" \
              data-src=\"https://encrypted-tbn0.example/lazy\">\
         </body></html>";

    let candidates = extract(&rendered_page(html), 10);

    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].source_url.as_str(),
        "https://encrypted-tbn0.example/lazy"
    );
}

#[test]
fn test_fragments_are_stripped_before_dedup() {
    let entries = [
        ResultEntry::Full {
            image: "https://cdn.example/a.jpg#view",
            referrer: "https://one.example/",
            thumb: "https://tbn.example/1",
        },
        ResultEntry::Full {
            image: "https://cdn.example/a.jpg",
            referrer: "https://two.example/",
            thumb: "https://tbn.example/2",
        },
    ];

    let candidates = extract(&rendered_page(results_page_html(&entries)), 10);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].source_url.as_str(), "https://cdn.example/a.jpg");
    assert!(candidates[0].source_url.fragment().is_none());
}

#[test]
fn test_relative_image_urls_resolve_against_the_page() {
    let html = results_page_html(&[ResultEntry::Full {
        image: "/images/branding/logo.png",
        referrer: "https://blog.example/",
        thumb: "https://tbn.example/1",
    }]);

    let candidates = extract(&rendered_page(html), 10);

    assert_eq!(candidates.len(), 1);
    assert_eq!(
        candidates[0].source_url.as_str(),
        "https://www.google.com/images/branding/logo.png"
    );
}

#[test]
fn test_page_without_results_yields_nothing() {
    let html = "<html><body><p>Your search did not match any images.</p></body></html>";
    let candidates = extract(&rendered_page(html), 10);
    assert!(candidates.is_empty());
}

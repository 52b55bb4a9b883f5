//! Test utilities and fixtures for the iget test suite

use std::collections::VecDeque;
use std::future::{self, Future};
use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;
use url::Url;

use iget::{GrabConfig, RenderedPage, SearchQuery, SessionDriver, SessionError};

/// Canonical 1x1 transparent PNG, small enough to inline everywhere
#[allow(dead_code)]
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// GIF89a header with a trailer, valid enough for sniffing
#[allow(dead_code)]
pub const TINY_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xFF\xFF\xFF;";

/// Creates a temporary directory for test output
#[allow(dead_code)]
pub fn create_test_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// URL the fixture results pages pretend to be served from
#[allow(dead_code)]
pub fn results_page_url() -> Url {
    Url::parse("https://www.google.com/search?tbm=isch&hl=en&q=test").unwrap()
}

/// One result tile on a fixture results page
#[allow(dead_code)]
pub enum ResultEntry<'a> {
    /// Anchor carrying full-resolution and referrer URLs, wrapping a thumbnail
    Full {
        image: &'a str,
        referrer: &'a str,
        thumb: &'a str,
    },
    /// Bare grid thumbnail with no surrounding anchor
    ThumbOnly { thumb: &'a str },
    /// Result anchor whose href carries no image URL
    AnchorWithoutImageUrl { thumb: &'a str },
}

/// Renders a results page in the shape the extractor expects
#[allow(dead_code)]
pub fn results_page_html(entries: &[ResultEntry<'_>]) -> String {
    let mut tiles = String::new();
    for entry in entries {
        match entry {
            ResultEntry::Full {
                image,
                referrer,
                thumb,
            } => {
                let href = format!(
                    "/imgres?imgurl={}&imgrefurl={}&h=600&w=800",
                    urlencoding::encode(image),
                    urlencoding::encode(referrer),
                );
                tiles.push_str(&format!(
                    "<a href=\"{}\"><img class=\"rg_i\" src=\"{}\"></a>\n",
                    html_escape::encode_double_quoted_attribute(&href),
                    html_escape::encode_double_quoted_attribute(*thumb),
                ));
            }
            ResultEntry::ThumbOnly { thumb } => {
                tiles.push_str(&format!(
                    "<img class=\"rg_i\" src=\"{}\">\n",
                    html_escape::encode_double_quoted_attribute(*thumb),
                ));
            }
            ResultEntry::AnchorWithoutImageUrl { thumb } => {
                tiles.push_str(&format!(
                    "<a href=\"/imgres?h=600&amp;w=800\"><img class=\"rg_i\" src=\"{}\"></a>\n",
                    html_escape::encode_double_quoted_attribute(*thumb),
                ));
            }
        }
    }
    format!(
        "<!DOCTYPE html><html><head><title>test - Search</title></head>\
         <body><div id=\"islrg\">{tiles}</div></body></html>"
    )
}

/// Wraps fixture HTML in a rendered page snapshot
#[allow(dead_code)]
pub fn rendered_page(html: impl Into<String>) -> RenderedPage {
    RenderedPage::new(results_page_url(), html.into())
}

/// Session driver fed from canned pages instead of a live browser
#[allow(dead_code)]
pub struct FixtureDriver {
    responses: VecDeque<Result<RenderedPage, SessionError>>,
}

#[allow(dead_code)]
impl FixtureDriver {
    pub fn new(responses: Vec<Result<RenderedPage, SessionError>>) -> Self {
        Self {
            responses: VecDeque::from(responses),
        }
    }

    pub fn single(page: RenderedPage) -> Self {
        Self::new(vec![Ok(page)])
    }

    pub fn failing(error: SessionError) -> Self {
        Self::new(vec![Err(error)])
    }
}

impl SessionDriver for FixtureDriver {
    fn open(
        &mut self,
        _query: &SearchQuery,
    ) -> impl Future<Output = Result<RenderedPage, SessionError>> + Send {
        let next = self
            .responses
            .pop_front()
            .unwrap_or_else(|| Err(SessionError::Unavailable("fixture exhausted".into())));
        future::ready(next)
    }
}

/// Config pointing at a test directory, with waits shortened for tests
#[allow(dead_code)]
pub fn test_config(output_dir: &Path, count: usize) -> GrabConfig {
    GrabConfig::builder()
        .query("red panda")
        .output_dir(output_dir)
        .count(count)
        .concurrency(3)
        .retry_base_delay_ms(1)
        .max_wait_secs(1)
        .build()
        .expect("test config must build")
}

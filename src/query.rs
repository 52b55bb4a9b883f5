//! Search query construction
//!
//! Builds the image results URL from query text plus advanced search
//! filters. Filters map to `tbs` tokens the search frontend understands;
//! unknown filter values are rejected at parse time, never passed through.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Search endpoint serving the image results page
pub const SEARCH_URL: &str = "https://www.google.com/search";

/// Image size filter (`isz` token family).
///
/// The three class variants map to plain `isz` tokens. `LargerThan`
/// variants map to the two-token `isz:lt,islt:<threshold>` form and are
/// spelled `>400x300`, `>2mp` and so on everywhere a size is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Large,
    Medium,
    Icon,
    /// Only images above a minimum resolution or pixel count
    LargerThan(SizeThreshold),
}

/// Minimum-size thresholds understood by the `islt` token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeThreshold {
    /// 400x300
    Qsvga,
    /// 640x480
    Vga,
    /// 800x600
    Svga,
    /// 1024x768
    Xga,
    TwoMp,
    FourMp,
    SixMp,
    EightMp,
    TenMp,
    TwelveMp,
    FifteenMp,
    TwentyMp,
    FortyMp,
    SeventyMp,
}

impl ImageSize {
    /// `tbs` token for this size
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Large => "isz:l",
            Self::Medium => "isz:m",
            Self::Icon => "isz:i",
            Self::LargerThan(threshold) => match threshold {
                SizeThreshold::Qsvga => "isz:lt,islt:qsvga",
                SizeThreshold::Vga => "isz:lt,islt:vga",
                SizeThreshold::Svga => "isz:lt,islt:svga",
                SizeThreshold::Xga => "isz:lt,islt:xga",
                SizeThreshold::TwoMp => "isz:lt,islt:2mp",
                SizeThreshold::FourMp => "isz:lt,islt:4mp",
                SizeThreshold::SixMp => "isz:lt,islt:6mp",
                SizeThreshold::EightMp => "isz:lt,islt:8mp",
                SizeThreshold::TenMp => "isz:lt,islt:10mp",
                SizeThreshold::TwelveMp => "isz:lt,islt:12mp",
                SizeThreshold::FifteenMp => "isz:lt,islt:15mp",
                SizeThreshold::TwentyMp => "isz:lt,islt:20mp",
                SizeThreshold::FortyMp => "isz:lt,islt:40mp",
                SizeThreshold::SeventyMp => "isz:lt,islt:70mp",
            },
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Medium => "medium",
            Self::Icon => "icon",
            Self::LargerThan(threshold) => match threshold {
                SizeThreshold::Qsvga => ">400x300",
                SizeThreshold::Vga => ">640x480",
                SizeThreshold::Svga => ">800x600",
                SizeThreshold::Xga => ">1024x768",
                SizeThreshold::TwoMp => ">2mp",
                SizeThreshold::FourMp => ">4mp",
                SizeThreshold::SixMp => ">6mp",
                SizeThreshold::EightMp => ">8mp",
                SizeThreshold::TenMp => ">10mp",
                SizeThreshold::TwelveMp => ">12mp",
                SizeThreshold::FifteenMp => ">15mp",
                SizeThreshold::TwentyMp => ">20mp",
                SizeThreshold::FortyMp => ">40mp",
                SizeThreshold::SeventyMp => ">70mp",
            },
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "large" => Ok(Self::Large),
            "medium" => Ok(Self::Medium),
            "icon" => Ok(Self::Icon),
            ">400x300" => Ok(Self::LargerThan(SizeThreshold::Qsvga)),
            ">640x480" => Ok(Self::LargerThan(SizeThreshold::Vga)),
            ">800x600" => Ok(Self::LargerThan(SizeThreshold::Svga)),
            ">1024x768" => Ok(Self::LargerThan(SizeThreshold::Xga)),
            ">2mp" => Ok(Self::LargerThan(SizeThreshold::TwoMp)),
            ">4mp" => Ok(Self::LargerThan(SizeThreshold::FourMp)),
            ">6mp" => Ok(Self::LargerThan(SizeThreshold::SixMp)),
            ">8mp" => Ok(Self::LargerThan(SizeThreshold::EightMp)),
            ">10mp" => Ok(Self::LargerThan(SizeThreshold::TenMp)),
            ">12mp" => Ok(Self::LargerThan(SizeThreshold::TwelveMp)),
            ">15mp" => Ok(Self::LargerThan(SizeThreshold::FifteenMp)),
            ">20mp" => Ok(Self::LargerThan(SizeThreshold::TwentyMp)),
            ">40mp" => Ok(Self::LargerThan(SizeThreshold::FortyMp)),
            ">70mp" => Ok(Self::LargerThan(SizeThreshold::SeventyMp)),
            other => bail!(
                "unknown image size '{other}' (expected: large, medium, icon, \
                 or a minimum size such as >800x600 or >2mp)"
            ),
        }
    }
}

// Serde reuses the `as_str`/`FromStr` spellings; a size is the same
// string in a config file as on the command line.
impl Serialize for ImageSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ImageSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Image kind filter (`itp` token family)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Clipart,
    Face,
    Lineart,
    Photo,
    Animated,
}

impl ImageType {
    /// `tbs` token for this image kind
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Clipart => "itp:clipart",
            Self::Face => "itp:face",
            Self::Lineart => "itp:lineart",
            Self::Photo => "itp:photo",
            Self::Animated => "itp:animated",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clipart => "clipart",
            Self::Face => "face",
            Self::Lineart => "lineart",
            Self::Photo => "photo",
            Self::Animated => "animated",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clipart" => Ok(Self::Clipart),
            "face" => Ok(Self::Face),
            "lineart" | "line-drawing" => Ok(Self::Lineart),
            "photo" => Ok(Self::Photo),
            "animated" => Ok(Self::Animated),
            other => bail!(
                "unknown image type '{other}' (expected: clipart, face, lineart, photo, animated)"
            ),
        }
    }
}

/// File format filter (`ift` token family)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Jpg,
    Gif,
    Png,
    Bmp,
    Svg,
    Webp,
    Ico,
}

impl FileType {
    /// `tbs` token for this file format
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Jpg => "ift:jpg",
            Self::Gif => "ift:gif",
            Self::Png => "ift:png",
            Self::Bmp => "ift:bmp",
            Self::Svg => "ift:svg",
            Self::Webp => "ift:webp",
            Self::Ico => "ift:ico",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Gif => "gif",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Svg => "svg",
            Self::Webp => "webp",
            Self::Ico => "ico",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "gif" => Ok(Self::Gif),
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            "svg" => Ok(Self::Svg),
            "webp" => Ok(Self::Webp),
            "ico" => Ok(Self::Ico),
            other => bail!(
                "unknown file type '{other}' (expected: jpg, gif, png, bmp, svg, webp, ico)"
            ),
        }
    }
}

/// Usage rights filter (`sur` token family)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageRights {
    /// Creative Commons licenses
    #[serde(rename = "cc")]
    CreativeCommons,
    /// Commercial and other licenses
    #[serde(rename = "other")]
    Other,
}

impl UsageRights {
    /// `tbs` token for this license class
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::CreativeCommons => "sur:cl",
            Self::Other => "sur:ol",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreativeCommons => "cc",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for UsageRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageRights {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cc" => Ok(Self::CreativeCommons),
            "other" => Ok(Self::Other),
            other => bail!("unknown usage rights '{other}' (expected: cc, other)"),
        }
    }
}

/// Advanced search filters applied to a query.
///
/// All fields are optional; the default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub size: Option<ImageSize>,
    pub image_type: Option<ImageType>,
    pub file_type: Option<FileType>,
    pub rights: Option<UsageRights>,
    /// Restrict to safe content (`safe=active`)
    pub safe_search: bool,
    /// Restrict results to a site or domain (`as_sitesearch`)
    pub site: Option<String>,
}

impl SearchFilters {
    /// Comma-joined `tbs` value, empty when no token filters are set.
    ///
    /// Token order is fixed so the same filters always produce the same
    /// URL: size, type, file format, rights.
    #[must_use]
    pub fn tbs_value(&self) -> String {
        let tokens = [
            self.size.map(ImageSize::param),
            self.image_type.map(ImageType::param),
            self.file_type.map(FileType::param),
            self.rights.map(UsageRights::param),
        ];
        tokens.into_iter().flatten().collect::<Vec<_>>().join(",")
    }
}

/// A single image search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query, encoded into the `q` parameter as-is
    pub text: String,
    /// Number of images the caller wants downloaded
    pub requested_count: usize,
    pub filters: SearchFilters,
}

impl SearchQuery {
    #[must_use]
    pub fn new(text: impl Into<String>, requested_count: usize) -> Self {
        Self {
            text: text.into(),
            requested_count,
            filters: SearchFilters::default(),
        }
    }

    /// Results page URL for this query.
    ///
    /// `tbm=isch` selects the image vertical, `hl=en` pins the interface
    /// language so the result markup stays predictable.
    pub fn results_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(SEARCH_URL)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("tbm", "isch");
            pairs.append_pair("hl", "en");
            pairs.append_pair("q", &self.text);

            let tbs = self.filters.tbs_value();
            if !tbs.is_empty() {
                pairs.append_pair("tbs", &tbs);
            }
            if let Some(site) = &self.filters.site {
                pairs.append_pair("as_sitesearch", site);
            }
            if self.filters.safe_search {
                pairs.append_pair("safe", "active");
            }
        }
        Ok(url)
    }
}

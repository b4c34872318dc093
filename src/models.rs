use crate::constants::*;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Date-time forms accepted with an explicit offset (after `Z` is rewritten to `+00:00`).
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Date-time forms accepted without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only forms; the time becomes midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Last modification time of a sitemap or URL entry.
///
/// Sitemaps mix date-only values, local timestamps and timestamps with an offset.
/// The distinction is kept so that exports render the value the way it was written:
/// `2005-05-06` becomes `2005-05-06T00:00:00`, `2010-10-01T18:32:17Z` becomes
/// `2010-10-01T18:32:17+00:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LastModified {
    /// No offset was given
    Naive(NaiveDateTime),
    /// An explicit offset (or `Z`) was given
    Zoned(DateTime<FixedOffset>),
}

impl LastModified {
    /// Parses W3C/ISO-8601 date and date-time text permissively.
    ///
    /// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `YYYYMMDD`, and a date followed by
    /// `T` or a space and `hh:mm[:ss[.fff]]`, optionally suffixed with `Z`, `±hh:mm`,
    /// `±hhmm` or `±hh`. Returns `None` for anything else, including out-of-range
    /// calendar values such as month 13.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let has_time = text.contains('T') || text.contains(' ');
        if has_time {
            let zoned = normalize_offset(text);
            if let Some(dt) = ZONED_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(&zoned, fmt).ok())
            {
                return Some(Self::Zoned(dt));
            }
            return NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(Self::Naive);
        }

        let expanded = match text.len() {
            4 => format!("{text}-01-01"),
            7 => format!("{text}-01"),
            _ => text.to_string(),
        };
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&expanded, fmt).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self::Naive)
    }
}

/// Rewrites `Z`, `±hhmm` and `±hh` suffixes into `±hh:mm`.
fn normalize_offset(text: &str) -> String {
    if let Some(stripped) = text.strip_suffix(['Z', 'z']) {
        return format!("{stripped}+00:00");
    }

    let bytes = text.as_bytes();
    let sign_pos = text.rfind(['+', '-']);
    match sign_pos {
        // only offsets that follow the time part, never the date separators
        Some(pos) if text[..pos].contains(':') => {
            let digits = &text[pos + 1..];
            if digits.bytes().all(|b| b.is_ascii_digit()) {
                match digits.len() {
                    2 => return format!("{text}:00"),
                    4 => {
                        let (head, minutes) = text.split_at(bytes.len() - 2);
                        return format!("{head}:{minutes}");
                    }
                    _ => {}
                }
            }
            text.to_string()
        }
        _ => text.to_string(),
    }
}

impl fmt::Display for LastModified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f%:z")),
        }
    }
}

impl FromStr for LastModified {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("'{s}' is not a valid W3C date-time"))
    }
}

impl Serialize for LastModified {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LastModified {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Keeps a priority only when it is finite and within `[0.0, 1.0]`.
///
/// Out-of-range values are dropped rather than clamped.
pub fn normalize_priority(priority: f64) -> Option<f64> {
    (priority.is_finite() && (0.0..=1.0).contains(&priority)).then_some(priority)
}

/// A `<sitemap>` entry of a sitemap index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sitemap {
    loc: String,
    lastmod: Option<LastModified>,
}

impl Sitemap {
    pub fn new(loc: impl Into<String>, lastmod: Option<LastModified>) -> Self {
        Self {
            loc: loc.into(),
            lastmod,
        }
    }

    /// Location of the referenced sitemap document.
    pub fn loc(&self) -> &str {
        &self.loc
    }

    pub fn lastmod(&self) -> Option<&LastModified> {
        self.lastmod.as_ref()
    }
}

impl fmt::Display for Sitemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.loc)
    }
}

/// A `<url>` entry of a URL set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UrlRecord")]
pub struct Url {
    loc: String,
    lastmod: Option<LastModified>,
    changefreq: Option<String>,
    priority: Option<f64>,
}

/// Wire shape of [`Url`]; deserialization goes through [`Url::new`] so priorities
/// are normalized the same way as parsed ones.
#[derive(Deserialize)]
struct UrlRecord {
    loc: String,
    lastmod: Option<LastModified>,
    changefreq: Option<String>,
    priority: Option<f64>,
}

impl From<UrlRecord> for Url {
    fn from(record: UrlRecord) -> Self {
        Url::new(
            record.loc,
            record.lastmod,
            record.changefreq,
            record.priority,
        )
    }
}

impl Url {
    /// Creates a URL entry. A priority outside `[0.0, 1.0]` (or NaN/infinite) is dropped.
    pub fn new(
        loc: impl Into<String>,
        lastmod: Option<LastModified>,
        changefreq: Option<String>,
        priority: Option<f64>,
    ) -> Self {
        Self {
            loc: loc.into(),
            lastmod,
            changefreq,
            priority: priority.and_then(normalize_priority),
        }
    }

    pub fn loc(&self) -> &str {
        &self.loc
    }

    pub fn lastmod(&self) -> Option<&LastModified> {
        self.lastmod.as_ref()
    }

    /// Change frequency exactly as found in the document.
    pub fn changefreq(&self) -> Option<&str> {
        self.changefreq.as_deref()
    }

    pub fn priority(&self) -> Option<f64> {
        self.priority
    }

    /// Whether the change frequency is one of the values listed by the sitemap protocol.
    ///
    /// Informational only; nonstandard values are kept as-is.
    pub fn has_standard_changefreq(&self) -> bool {
        self.changefreq
            .as_deref()
            .is_some_and(|freq| STANDARD_CHANGEFREQS.contains(&freq))
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.loc)
    }
}

/// Ordered `<sitemap>` entries of a sitemap index, in document order.
///
/// Iterating borrows the entries, so the sequence can be walked any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapIndex {
    sitemaps: Vec<Sitemap>,
}

impl SitemapIndex {
    pub fn new(sitemaps: Vec<Sitemap>) -> Self {
        Self { sitemaps }
    }

    pub fn len(&self) -> usize {
        self.sitemaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sitemaps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sitemap> {
        self.sitemaps.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sitemap> {
        self.sitemaps.iter()
    }

    pub fn as_slice(&self) -> &[Sitemap] {
        &self.sitemaps
    }
}

impl<'a> IntoIterator for &'a SitemapIndex {
    type Item = &'a Sitemap;
    type IntoIter = std::slice::Iter<'a, Sitemap>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Sitemap> for SitemapIndex {
    fn from_iter<I: IntoIterator<Item = Sitemap>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Ordered `<url>` entries of a URL set, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlSet {
    urls: Vec<Url>,
}

impl UrlSet {
    pub fn new(urls: Vec<Url>) -> Self {
        Self { urls }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Url> {
        self.urls.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Url> {
        self.urls.iter()
    }

    pub fn as_slice(&self) -> &[Url] {
        &self.urls
    }
}

impl<'a> IntoIterator for &'a UrlSet {
    type Item = &'a Url;
    type IntoIter = std::slice::Iter<'a, Url>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Url> for UrlSet {
    fn from_iter<I: IntoIterator<Item = Url>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Classification of a document by the local name of its root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `<sitemapindex>`
    Index,
    /// `<urlset>`
    UrlSet,
    /// Any other root element
    Unknown,
}

impl DocumentKind {
    pub fn from_root_name(local_name: &str) -> Self {
        match local_name {
            SITEMAP_INDEX_TAG => Self::Index,
            URL_SET_TAG => Self::UrlSet,
            _ => Self::Unknown,
        }
    }

    /// Returns a human-readable name for the document kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Index => "sitemap index",
            Self::UrlSet => "url set",
            Self::Unknown => "unknown document",
        }
    }
}

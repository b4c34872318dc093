use super::element::{parse_element_tree, XmlElement};
use crate::constants::*;
use crate::errors::AppResult;
use crate::models::{DocumentKind, LastModified, Sitemap, SitemapIndex, Url, UrlSet};
use tracing::{debug, info};

/// Classified document: the root kind and the entry elements found under it.
///
/// Entries are the direct children of the root named `sitemap` (index) or `url`
/// (url set). An unknown root never yields entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    kind: DocumentKind,
    entries: Vec<XmlElement>,
}

impl ParsedDocument {
    /// Parses raw bytes and classifies the root element.
    ///
    /// # Errors
    ///
    /// Returns `MalformedXml` if the bytes are not a well-formed XML document.
    pub fn parse(content: &[u8]) -> AppResult<Self> {
        let root = parse_element_tree(content)?;
        Ok(Self::from_root(root))
    }

    pub fn from_root(root: XmlElement) -> Self {
        let kind = DocumentKind::from_root_name(root.local_name());
        match root.declared_namespace() {
            Some(SITEMAP_NAMESPACE) => {}
            other => debug!(
                root = root.name(),
                namespace = other.unwrap_or("<none>"),
                "Root element is not in the sitemaps.org namespace"
            ),
        }

        let entry_tag = match kind {
            DocumentKind::Index => SITEMAP_TAG,
            DocumentKind::UrlSet => URL_TAG,
            DocumentKind::Unknown => {
                info!(root = root.name(), "Root element is not a sitemap document");
                return Self {
                    kind,
                    entries: Vec::new(),
                };
            }
        };

        let entries: Vec<XmlElement> = root
            .into_children()
            .into_iter()
            .filter(|child| child.local_name() == entry_tag)
            .collect();

        info!(
            kind = kind.display_name(),
            candidates = entries.len(),
            "Classified sitemap document"
        );

        Self { kind, entries }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Entry candidates in document order.
    pub fn entries(&self) -> &[XmlElement] {
        &self.entries
    }

    /// Builds the sitemap entries. Candidates without a `loc` are skipped.
    ///
    /// Returns an empty index for documents that are not sitemap indexes.
    pub fn sitemap_index(&self) -> SitemapIndex {
        if self.kind != DocumentKind::Index {
            return SitemapIndex::default();
        }
        let sitemaps: SitemapIndex = self.entries.iter().filter_map(sitemap_from_element).collect();
        log_dropped(self.entries.len(), sitemaps.len());
        sitemaps
    }

    /// Builds the URL entries. Candidates without a `loc` are skipped.
    ///
    /// Returns an empty set for documents that are not URL sets.
    pub fn url_set(&self) -> UrlSet {
        if self.kind != DocumentKind::UrlSet {
            return UrlSet::default();
        }
        let urls: UrlSet = self.entries.iter().filter_map(url_from_element).collect();
        log_dropped(self.entries.len(), urls.len());
        urls
    }
}

fn log_dropped(candidates: usize, kept: usize) {
    if kept < candidates {
        debug!(
            dropped = candidates - kept,
            kept = kept,
            "Skipped entries without a location"
        );
    }
}

/// Trimmed text of the first direct child named `tag`.
///
/// Later duplicates are ignored, so the first element wins even when it is empty.
fn field_text<'a>(entry: &'a XmlElement, tag: &str) -> Option<&'a str> {
    entry.first_child(tag).and_then(XmlElement::trimmed_text)
}

fn parse_lastmod(entry: &XmlElement) -> Option<LastModified> {
    let text = field_text(entry, LASTMOD_TAG)?;
    let lastmod = LastModified::parse(text);
    if lastmod.is_none() {
        debug!(value = text, "Ignoring unparseable lastmod");
    }
    lastmod
}

fn parse_priority(entry: &XmlElement) -> Option<f64> {
    let text = field_text(entry, PRIORITY_TAG)?;
    let priority = text.parse::<f64>().ok();
    if priority.is_none() {
        debug!(value = text, "Ignoring unparseable priority");
    }
    priority
}

/// Maps a `<sitemap>` element to a [`Sitemap`]; `None` when `loc` is missing or empty.
pub(crate) fn sitemap_from_element(element: &XmlElement) -> Option<Sitemap> {
    let loc = field_text(element, LOC_TAG)?;
    Some(Sitemap::new(loc, parse_lastmod(element)))
}

/// Maps a `<url>` element to a [`Url`]; `None` when `loc` is missing or empty.
pub(crate) fn url_from_element(element: &XmlElement) -> Option<Url> {
    let loc = field_text(element, LOC_TAG)?;
    Some(Url::new(
        loc,
        parse_lastmod(element),
        field_text(element, CHANGEFREQ_TAG).map(str::to_string),
        parse_priority(element),
    ))
}

use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::exporter::Exporter;
use crate::models::{DocumentKind, SitemapIndex, UrlSet};
use crate::parser::ParsedDocument;
use crate::source::{fetcher_from_config, parse_location, Fetcher, SourceResolver};
use std::fmt;
use tracing::info;

/// Typed content of a parsed document. A document holds sitemaps, URLs or neither,
/// never both.
#[derive(Debug, Clone, PartialEq)]
enum Content {
    Index(SitemapIndex),
    UrlSet(UrlSet),
    Unknown,
}

/// A parsed sitemap document and the query surface over it.
///
/// Parsing happens eagerly in the constructors; the result is immutable afterwards.
/// Requesting the collection a document does not hold is an error:
/// [`get_sitemaps`](Self::get_sitemaps) on a URL set (or unknown document) and
/// [`get_urls`](Self::get_urls) on a sitemap index (or unknown document) both return
/// [`AppError::InvalidState`]. Check [`has_sitemaps`](Self::has_sitemaps) /
/// [`has_urls`](Self::has_urls) first.
///
/// # Example
///
/// ```
/// use sitemap_parser::SitemapParser;
///
/// # fn main() -> Result<(), sitemap_parser::errors::AppError> {
/// let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <url><loc>https://example.com/</loc><priority>0.8</priority></url>
/// </urlset>"#;
///
/// let parser = SitemapParser::from_bytes(xml.as_bytes())?;
/// assert!(parser.has_urls());
/// for url in parser.get_urls()? {
///     println!("{} {:?}", url.loc(), url.priority());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapParser {
    content: Content,
}

impl SitemapParser {
    /// Resolves `source` and parses it.
    ///
    /// With `is_data_string` set, `source` is literal XML. Otherwise it is fetched over
    /// HTTP using `config` (timeouts, retries and, if enabled, the file cache).
    ///
    /// # Errors
    ///
    /// - `InvalidSource` if `source` is not a well-formed URL
    /// - `Fetch` if downloading fails
    /// - `MalformedXml` if the payload is not well-formed XML
    /// - `Io` if the cache directory cannot be created
    ///
    /// The location is validated before any fetcher or cache directory is set up.
    /// Called from inside an async runtime, fetching fails with `Fetch` instead of
    /// blocking the runtime's thread.
    pub fn new(source: &str, is_data_string: bool, config: &ResolvedConfig) -> AppResult<Self> {
        if is_data_string {
            return Self::from_bytes(source.as_bytes());
        }
        parse_location(source)?;
        let fetcher = fetcher_from_config(config)?;
        Self::with_fetcher(source, is_data_string, fetcher)
    }

    /// Resolves `source` through a caller-supplied fetcher and parses it.
    pub fn with_fetcher<F: Fetcher>(
        source: &str,
        is_data_string: bool,
        fetcher: F,
    ) -> AppResult<Self> {
        let data = SourceResolver::new(fetcher).resolve(source, is_data_string)?;
        Self::from_bytes(&data)
    }

    /// Parses raw document bytes.
    pub fn from_bytes(data: &[u8]) -> AppResult<Self> {
        let document = ParsedDocument::parse(data)?;
        Ok(Self::from_document(&document))
    }

    /// Builds the typed collection for a classified document.
    pub fn from_document(document: &ParsedDocument) -> Self {
        let content = match document.kind() {
            DocumentKind::Index => Content::Index(document.sitemap_index()),
            DocumentKind::UrlSet => Content::UrlSet(document.url_set()),
            DocumentKind::Unknown => Content::Unknown,
        };
        let parser = Self { content };
        info!(
            kind = parser.kind().display_name(),
            entries = parser.entry_count(),
            "Parsed sitemap document"
        );
        parser
    }

    pub fn kind(&self) -> DocumentKind {
        match self.content {
            Content::Index(_) => DocumentKind::Index,
            Content::UrlSet(_) => DocumentKind::UrlSet,
            Content::Unknown => DocumentKind::Unknown,
        }
    }

    /// Whether the document is a sitemap index.
    pub fn has_sitemaps(&self) -> bool {
        matches!(self.content, Content::Index(_))
    }

    /// Whether the document is a URL set.
    pub fn has_urls(&self) -> bool {
        matches!(self.content, Content::UrlSet(_))
    }

    /// Returns the sitemaps of a sitemap index.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the root is not a `<sitemapindex>`.
    pub fn get_sitemaps(&self) -> AppResult<&SitemapIndex> {
        match &self.content {
            Content::Index(sitemaps) => Ok(sitemaps),
            _ => Err(AppError::InvalidState(format!(
                "Sitemaps requested but the root is a {}, not a <sitemapindex>",
                self.kind().display_name()
            ))),
        }
    }

    /// Returns the URLs of a URL set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the root is not a `<urlset>`.
    pub fn get_urls(&self) -> AppResult<&UrlSet> {
        match &self.content {
            Content::UrlSet(urls) => Ok(urls),
            _ => Err(AppError::InvalidState(format!(
                "URLs requested but the root is a {}, not a <urlset>",
                self.kind().display_name()
            ))),
        }
    }

    /// Exports whichever collection the document holds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` for unknown documents, or the exporter's error.
    pub fn export(&self, exporter: &dyn Exporter) -> AppResult<String> {
        match &self.content {
            Content::Index(sitemaps) => exporter.export_sitemaps(sitemaps),
            Content::UrlSet(urls) => exporter.export_urls(urls),
            Content::Unknown => Err(AppError::InvalidState(
                "Nothing to export: the root is neither <sitemapindex> nor <urlset>".into(),
            )),
        }
    }

    fn entry_count(&self) -> usize {
        match &self.content {
            Content::Index(sitemaps) => sitemaps.len(),
            Content::UrlSet(urls) => urls.len(),
            Content::Unknown => 0,
        }
    }
}

impl fmt::Display for SitemapParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with {} entries",
            self.kind().display_name(),
            self.entry_count()
        )
    }
}

//! Flat serializations of parsed sitemap collections.
//!
//! Exporters are pure transformations: they never fetch or parse. Field names follow
//! the sitemap protocol (`loc`, `lastmod`, `changefreq`, `priority`) and dates are
//! rendered as ISO-8601 text.

mod csv;
mod json;

use crate::errors::{AppError, AppResult};
use crate::models::{SitemapIndex, UrlSet};

// Re-export public API
pub use self::csv::CsvExporter;
pub use self::json::JsonExporter;

pub trait Exporter {
    /// Name used to select the exporter, e.g. on the command line.
    fn short_name(&self) -> &'static str;

    fn export_sitemaps(&self, sitemaps: &SitemapIndex) -> AppResult<String>;

    fn export_urls(&self, urls: &UrlSet) -> AppResult<String>;
}

/// Looks up an exporter by its short name (`json` or `csv`, case-insensitive).
pub fn exporter_for(name: &str) -> AppResult<Box<dyn Exporter>> {
    match name.trim().to_lowercase().as_str() {
        "json" => Ok(Box::new(JsonExporter)),
        "csv" => Ok(Box::new(CsvExporter)),
        other => Err(AppError::InvalidInput(format!(
            "Unknown export format '{other}' (expected json or csv)"
        ))),
    }
}

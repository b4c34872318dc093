use super::Exporter;
use crate::errors::AppResult;
use crate::models::{SitemapIndex, UrlSet};

/// Exports collections as a JSON array of objects, `null` for absent fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn short_name(&self) -> &'static str {
        "json"
    }

    fn export_sitemaps(&self, sitemaps: &SitemapIndex) -> AppResult<String> {
        Ok(serde_json::to_string(sitemaps.as_slice())?)
    }

    fn export_urls(&self, urls: &UrlSet) -> AppResult<String> {
        Ok(serde_json::to_string(urls.as_slice())?)
    }
}

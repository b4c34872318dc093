use super::Exporter;
use crate::constants::{SITEMAP_FIELDS, URL_FIELDS};
use crate::errors::{AppError, AppResult};
use crate::models::{SitemapIndex, UrlSet};
use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;

const LINE_TERMINATOR: &str = "\r\n";

/// Writes a header row followed by one row per record.
///
/// Text is quoted, numbers are not, and absent values become `""`. The header is
/// written even when there are no records.
fn write_records<'a, T, I>(fields: &[&str], records: I) -> AppResult<String>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::NonNumeric)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(fields)?;
    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Io(format!("Failed to flush CSV output: {}", e.error())))?;
    let mut out = String::from_utf8(bytes)
        .map_err(|e| AppError::InvalidInput(format!("CSV output is not valid UTF-8: {e}")))?;

    // no terminator after the last row
    if out.ends_with(LINE_TERMINATOR) {
        out.truncate(out.len() - LINE_TERMINATOR.len());
    }
    Ok(out)
}

/// Exports collections as CSV: a quoted header row, CRLF line endings, quoted text,
/// bare numbers, `""` for absent values and no trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn short_name(&self) -> &'static str {
        "csv"
    }

    fn export_sitemaps(&self, sitemaps: &SitemapIndex) -> AppResult<String> {
        write_records(SITEMAP_FIELDS, sitemaps)
    }

    fn export_urls(&self, urls: &UrlSet) -> AppResult<String> {
        write_records(URL_FIELDS, urls)
    }
}

//! sitemap-parser library
//!
//! Fetches and parses XML sitemaps (`<urlset>`) and sitemap indexes (`<sitemapindex>`)
//! into typed, immutable collections, with JSON and CSV export.
//!
//! ## Overview
//!
//! - [`source`] - Resolves a source string into raw bytes (literal XML or an HTTP fetch, optionally cached)
//! - [`parser`] - Parses raw bytes into an element tree and classifies the document
//! - [`models`] - `Sitemap`, `Url`, `SitemapIndex`, `UrlSet` and date/priority normalization
//! - [`site_map_parser`] - The query interface: `has_sitemaps`, `get_urls`, ...
//! - [`exporter`] - JSON and CSV exporters
//! - [`config`] - Fetch and cache configuration, loadable from TOML
//! - [`errors`] - Error types used throughout the library
//! - [`cli`] - Command-line front end used by the `sitemap-parser` binary
//!
//! ## Example Usage
//!
//! ```no_run
//! use sitemap_parser::{config::ResolvedConfig, errors::AppResult, SitemapParser};
//!
//! # fn example() -> AppResult<()> {
//! let config = ResolvedConfig::default();
//! let parser = SitemapParser::new("https://example.com/sitemap.xml", false, &config)?;
//!
//! if parser.has_sitemaps() {
//!     for sitemap in parser.get_sitemaps()? {
//!         let child = SitemapParser::new(sitemap.loc(), false, &config)?;
//!         println!("{child}");
//!     }
//! } else if parser.has_urls() {
//!     for url in parser.get_urls()? {
//!         println!("{url}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod exporter;
pub mod models;
pub mod parser;
pub mod site_map_parser;
pub mod source;

pub use site_map_parser::SitemapParser;

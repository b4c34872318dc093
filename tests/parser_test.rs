//! Integration tests for document parsing and the query interface

#[path = "common/mod.rs"]
mod common;

use common::*;
use sitemap_parser::errors::AppError;
use sitemap_parser::models::DocumentKind;
use sitemap_parser::SitemapParser;

#[test]
fn test_urlset_document_has_urls_only() {
    let parser = SitemapParser::from_bytes(URLSET_XML.as_bytes()).unwrap();
    assert!(parser.has_urls());
    assert!(!parser.has_sitemaps());

    let urls = parser.get_urls().unwrap();
    assert_eq!(urls.len(), 4);
    let locs: Vec<&str> = urls.iter().map(|u| u.loc()).collect();
    assert_eq!(
        locs,
        vec![
            "http://www.example.com/page/a/1",
            "http://www.example.com/page/a/2",
            "http://www.example.com/page/a/3?sort=asc&page=2",
            "http://www.example.com/page/a/4",
        ]
    );
}

#[test]
fn test_sitemap_index_document_has_sitemaps_only() {
    let parser = SitemapParser::from_bytes(SITEMAP_INDEX_XML.as_bytes()).unwrap();
    assert!(parser.has_sitemaps());
    assert!(!parser.has_urls());

    let sitemaps = parser.get_sitemaps().unwrap();
    assert_eq!(sitemaps.len(), 3);
    assert_eq!(
        sitemaps.get(1).unwrap().lastmod().unwrap().to_string(),
        "2005-01-01T00:00:00"
    );
    assert!(sitemaps.get(2).unwrap().lastmod().is_none());
}

#[test]
fn test_single_url_example() {
    let xml = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/</loc><priority>0.8</priority></url></urlset>"#;
    let parser = SitemapParser::from_bytes(xml.as_bytes()).unwrap();
    let urls = parser.get_urls().unwrap();
    assert_eq!(urls.len(), 1);

    let url = urls.get(0).unwrap();
    assert_eq!(url.loc(), "https://example.com/");
    assert_eq!(url.priority(), Some(0.8));
    assert!(url.lastmod().is_none());
    assert!(url.changefreq().is_none());
}

#[test]
fn test_out_of_range_priority_is_absent() {
    for value in ["1.5", "-0.1", "NaN", "inf"] {
        let xml = format!(
            "<urlset><url><loc>https://example.com/</loc><priority>{value}</priority></url></urlset>"
        );
        let parser = SitemapParser::from_bytes(xml.as_bytes()).unwrap();
        let url = parser.get_urls().unwrap().get(0).unwrap().clone();
        assert_eq!(url.priority(), None, "priority {value}");
    }
}

#[test]
fn test_unterminated_document_is_malformed_not_empty() {
    let err = SitemapParser::from_bytes(b"<urlset><url><loc>").unwrap_err();
    assert!(matches!(err, AppError::MalformedXml(_)));
}

#[test]
fn test_entry_missing_loc_is_excluded() {
    let xml = r#"<urlset>
  <url><lastmod>2020-01-01</lastmod></url>
  <url><loc>https://example.com/</loc></url>
</urlset>"#;
    let parser = SitemapParser::from_bytes(xml.as_bytes()).unwrap();
    let urls = parser.get_urls().unwrap();
    assert_eq!(urls.len(), 1);
    assert_eq!(urls.get(0).unwrap().loc(), "https://example.com/");
}

#[test]
fn test_sitemap_missing_loc_is_excluded() {
    let xml = r#"<sitemapindex>
  <sitemap><lastmod>2020-01-01</lastmod></sitemap>
  <sitemap><loc>https://example.com/a.xml</loc></sitemap>
</sitemapindex>"#;
    let parser = SitemapParser::from_bytes(xml.as_bytes()).unwrap();
    assert_eq!(parser.get_sitemaps().unwrap().len(), 1);
}

#[test]
fn test_unknown_root_is_not_an_error() {
    let parser = SitemapParser::from_bytes(b"<feed><entry><id>1</id></entry></feed>").unwrap();
    assert_eq!(parser.kind(), DocumentKind::Unknown);
    assert!(!parser.has_sitemaps());
    assert!(!parser.has_urls());
}

#[test]
fn test_parsing_is_idempotent() {
    let first = SitemapParser::from_bytes(URLSET_XML.as_bytes()).unwrap();
    let second = SitemapParser::from_bytes(URLSET_XML.as_bytes()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.get_urls().unwrap(), second.get_urls().unwrap());
}

#[test]
fn test_iteration_is_restartable() {
    let parser = SitemapParser::from_bytes(URLSET_XML.as_bytes()).unwrap();
    let urls = parser.get_urls().unwrap();
    let first: Vec<String> = urls.iter().map(|u| u.loc().to_string()).collect();
    let second: Vec<String> = urls.into_iter().map(|u| u.loc().to_string()).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn test_nonstandard_changefreq_is_kept() {
    let parser = SitemapParser::from_bytes(URLSET_XML.as_bytes()).unwrap();
    let url = parser.get_urls().unwrap().get(2).unwrap().clone();
    assert_eq!(url.changefreq(), Some("sometimes"));
    assert!(!url.has_standard_changefreq());
}

#[test]
fn test_duplicate_loc_uses_first() {
    let xml = "<urlset><url><loc>https://example.com/1</loc><loc>https://example.com/2</loc></url></urlset>";
    let parser = SitemapParser::from_bytes(xml.as_bytes()).unwrap();
    assert_eq!(
        parser.get_urls().unwrap().get(0).unwrap().loc(),
        "https://example.com/1"
    );
}

#[test]
fn test_zero_entry_document_differs_from_failure() {
    let empty = SitemapParser::from_bytes(b"<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"></urlset>");
    assert!(empty.unwrap().get_urls().unwrap().is_empty());

    let broken = SitemapParser::from_bytes(b"<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">");
    assert!(broken.is_err());
}

#[test]
fn test_invalid_bytes_in_attribute_fail_the_parse() {
    let err = SitemapParser::from_bytes(
        b"<urlset foo=\"\xFF\xFE\"><url><loc>https://e.com/</loc></url></urlset>",
    )
    .unwrap_err();
    assert!(matches!(err, AppError::MalformedXml(_)));
}

#[test]
fn test_internal_dtd_entity_in_loc() {
    let xml = r#"<!DOCTYPE urlset [<!ENTITY e "https://x/">]>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>&e;about</loc></url></urlset>"#;
    let parser = SitemapParser::from_bytes(xml.as_bytes()).unwrap();
    assert_eq!(
        parser.get_urls().unwrap().get(0).unwrap().loc(),
        "https://x/about"
    );
}

//! Common test utilities for integration tests

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Sample sitemap index with three sitemaps
#[allow(dead_code)]
pub const SITEMAP_INDEX_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap>
    <loc>http://www.example.com/sitemap_a.xml</loc>
    <lastmod>2004-10-01T18:23:17+00:00</lastmod>
  </sitemap>
  <sitemap>
    <loc>http://www.example.com/sitemap_b.xml</loc>
    <lastmod>2005-01-01</lastmod>
  </sitemap>
  <sitemap>
    <loc>http://www.example.com/sitemap_c.xml</loc>
  </sitemap>
</sitemapindex>"#;

/// Sample URL set with four URLs
#[allow(dead_code)]
pub const URLSET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>http://www.example.com/page/a/1</loc>
    <lastmod>2005-05-06</lastmod>
    <changefreq>monthly</changefreq>
    <priority>0.8</priority>
  </url>
  <url>
    <loc>http://www.example.com/page/a/2</loc>
    <lastmod>2006-07-08T12:30:00Z</lastmod>
    <changefreq>weekly</changefreq>
    <priority>0.9</priority>
  </url>
  <url>
    <loc>http://www.example.com/page/a/3?sort=asc&amp;page=2</loc>
    <changefreq>sometimes</changefreq>
  </url>
  <url>
    <loc>http://www.example.com/page/a/4</loc>
    <lastmod>2008-11-12</lastmod>
    <priority>1.0</priority>
  </url>
</urlset>"#;

/// A canned HTTP response served by [`serve_responses`]
#[allow(dead_code)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

#[allow(dead_code)]
impl CannedResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Local HTTP server answering one connection per canned response, in order
#[allow(dead_code)]
pub struct TestServer {
    pub base_url: String,
    pub requests: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn join(self) {
        self.handle.join().unwrap();
    }
}

/// Starts a throwaway HTTP/1.1 server on 127.0.0.1 serving `responses` in order
#[allow(dead_code)]
pub fn serve_responses(responses: Vec<CannedResponse>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);

    let handle = thread::spawn(move || {
        for response in responses {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };

            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }
            counter.fetch_add(1, Ordering::SeqCst);

            let head = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                response.status,
                response.body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(response.body.as_bytes());
            let _ = stream.flush();
        }
    });

    TestServer {
        base_url,
        requests,
        handle,
    }
}

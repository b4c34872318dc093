// Sitemap protocol namespace (expected, not enforced)
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

// Root element local names
pub const SITEMAP_INDEX_TAG: &str = "sitemapindex";
pub const URL_SET_TAG: &str = "urlset";

// Entry element local names
pub const SITEMAP_TAG: &str = "sitemap";
pub const URL_TAG: &str = "url";

// Field element local names
pub const LOC_TAG: &str = "loc";
pub const LASTMOD_TAG: &str = "lastmod";
pub const CHANGEFREQ_TAG: &str = "changefreq";
pub const PRIORITY_TAG: &str = "priority";

// Exported field order
pub const SITEMAP_FIELDS: &[&str] = &["loc", "lastmod"];
pub const URL_FIELDS: &[&str] = &["loc", "lastmod", "changefreq", "priority"];

// Change frequencies listed by the sitemap protocol
pub const STANDARD_CHANGEFREQS: &[&str] = &[
    "always", "hourly", "daily", "weekly", "monthly", "yearly", "never",
];

// HTTP / cache defaults
pub const DEFAULT_CACHE_DIR: &str = ".cache";
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 3600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("sitemap-parser/", env!("CARGO_PKG_VERSION"));

mod document;
mod element;

// Re-export public API
pub use document::ParsedDocument;
pub use element::{parse_element_tree, XmlElement};

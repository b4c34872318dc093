use crate::errors::{AppError, AppResult};
use quick_xml::encoding::Decoder;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::OnceLock;
use tracing::debug;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// General entity declared with a literal value; parameter and external entities never match
const ENTITY_DECL_PATTERN: &str = r#"<!ENTITY\s+([^\s%"'<>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#;

static ENTITY_DECL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Generic XML element: qualified name, attributes, child elements and the
/// concatenated character data found directly inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>, decoder: Decoder) -> AppResult<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| AppError::MalformedXml(format!("Invalid UTF-8 in element name: {e}")))?
            .to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                AppError::MalformedXml(format!("Invalid attribute on <{name}>: {e}"))
            })?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| {
                    AppError::MalformedXml(format!("Invalid UTF-8 in attribute name on <{name}>: {e}"))
                })?
                .to_string();
            let value = attr.decode_and_unescape_value(decoder).map_err(|e| {
                AppError::MalformedXml(format!("Invalid value for attribute {key} on <{name}>: {e}"))
            })?;
            attributes.push((key, value.into_owned()));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Qualified tag name, including any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Namespace URI bound to this element's prefix by a declaration on the element itself.
    pub fn declared_namespace(&self) -> Option<&str> {
        match self.prefix() {
            Some(prefix) => self.attribute(&format!("xmlns:{prefix}")),
            None => self.attribute("xmlns"),
        }
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First direct child element whose local name is `local_name`.
    pub fn first_child(&self, local_name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|child| child.local_name() == local_name)
    }

    /// Character data directly inside this element (text, CDATA and resolved references).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text with surrounding whitespace removed; `None` when nothing is left.
    pub fn trimmed_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn into_children(self) -> Vec<XmlElement> {
        self.children
    }
}

/// Builds the element tree of a complete XML document.
///
/// The document must be well-formed: exactly one root element, balanced and matching
/// tags, valid UTF-8, known entity references, and no character data outside the root.
/// Comments, processing instructions and the XML declaration are skipped.
///
/// General entities declared with a literal value in the DOCTYPE's internal subset are
/// expanded as plain text. External entities (`SYSTEM`/`PUBLIC`) are never loaded, so
/// references to them are reported as undefined.
///
/// # Errors
///
/// Returns `MalformedXml` describing the first problem found.
pub fn parse_element_tree(content: &[u8]) -> AppResult<XmlElement> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut reader = Reader::from_reader(Cursor::new(content));

    let mut buf = Vec::with_capacity(8192);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut entities: HashMap<String, String> = HashMap::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            AppError::MalformedXml(format!(
                "{e} (at byte {})",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                ensure_no_second_root(&stack, &root)?;
                stack.push(XmlElement::from_start(&e, reader.decoder())?);
            }
            Event::Empty(e) => {
                ensure_no_second_root(&stack, &root)?;
                let element = XmlElement::from_start(&e, reader.decoder())?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(e) => {
                let element = stack.pop().ok_or_else(|| {
                    AppError::MalformedXml(format!(
                        "Unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(e) => {
                let text = e.decode().map_err(|e| {
                    AppError::MalformedXml(format!("Failed to decode XML text: {e}"))
                })?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let text = e.decode().map_err(|e| {
                    AppError::MalformedXml(format!("Failed to decode CDATA section: {e}"))
                })?;
                push_text(&mut stack, &text)?;
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref()? {
                    push_text(&mut stack, ch.encode_utf8(&mut [0; 4]))?;
                } else {
                    let name = e.decode().map_err(|e| {
                        AppError::MalformedXml(format!("Failed to decode entity reference: {e}"))
                    })?;
                    let predefined: Option<&str> = resolve_predefined_entity(&name);
                    let resolved = predefined
                        .or_else(|| entities.get(name.as_ref()).map(String::as_str))
                        .ok_or_else(|| {
                            AppError::MalformedXml(format!("Undefined entity reference &{name};"))
                        })?;
                    push_text(&mut stack, resolved)?;
                }
            }
            Event::DocType(e) => {
                let doctype = e.decode().map_err(|e| {
                    AppError::MalformedXml(format!("Failed to decode DOCTYPE: {e}"))
                })?;
                entities = internal_entities(&doctype);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(AppError::MalformedXml(format!(
            "Unexpected end of document: <{}> is not closed",
            open.name()
        )));
    }

    root.ok_or_else(|| AppError::MalformedXml("Document has no root element".into()))
}

/// Literal general entities declared in a DOCTYPE's internal subset.
///
/// Character and predefined references inside a value are resolved; a value that
/// cannot be unescaped is kept as written. The first declaration of a name wins.
fn internal_entities(doctype: &str) -> HashMap<String, String> {
    let regex = ENTITY_DECL_REGEX.get_or_init(|| {
        Regex::new(ENTITY_DECL_PATTERN).expect("ENTITY_DECL_PATTERN is a valid regex pattern")
    });

    let mut entities = HashMap::new();
    for captures in regex.captures_iter(doctype) {
        let (Some(name), Some(value)) = (captures.get(1), captures.get(2).or(captures.get(3)))
        else {
            continue;
        };
        let value = unescape(value.as_str())
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.as_str().to_string());
        entities.entry(name.as_str().to_string()).or_insert(value);
    }
    if !entities.is_empty() {
        debug!(count = entities.len(), "Loaded entities from internal DTD subset");
    }
    entities
}

fn ensure_no_second_root(stack: &[XmlElement], root: &Option<XmlElement>) -> AppResult<()> {
    if stack.is_empty() && root.is_some() {
        return Err(AppError::MalformedXml(
            "Document has more than one root element".into(),
        ));
    }
    Ok(())
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) -> AppResult<()> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(AppError::MalformedXml(
            "Character data outside the root element".into(),
        )),
    }
}

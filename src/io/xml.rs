//! A small element tree over quick-xml, shared by the KML and GML readers.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{GeodexError, Result};
use crate::geometry::CoordSeq;

/// Deepest element nesting accepted.
const MAX_DEPTH: usize = 256;

/// An XML element reduced to what the geometry readers need. Names are local names, with any
/// namespace prefix removed.
#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
    /// Byte offset of the start tag in the input.
    pub offset: usize,
}

impl Element {
    fn from_start(start: &BytesStart, offset: usize) -> Result<Self> {
        let mut attributes = vec![];
        for attr in start.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| GeodexError::parse(offset, e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            attributes,
            text: String::new(),
            children: vec![],
            offset,
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Depth-first search for the first element, this one included, matching `predicate`.
    pub fn find(&self, predicate: &impl Fn(&Element) -> bool) -> Option<&Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Parse a document or fragment into the tree of its first top-level element.
///
/// # Errors
///
/// - [`GeodexError::Parse`] for malformed XML, mismatched tags, or input with no element
pub(crate) fn parse_document(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = vec![];
    let mut root = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(GeodexError::parse(offset, "XML nesting is too deep"));
                }
                stack.push(Element::from_start(e, offset)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = Element::from_start(e, offset)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| GeodexError::parse(offset, err.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GeodexError::parse(
                    reader.buffer_position() as usize,
                    format!("XML parse error: {e}"),
                ))
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(GeodexError::parse(
            open.offset,
            format!("<{}> is never closed", open.name),
        ));
    }
    root.ok_or_else(|| GeodexError::parse(0, "no XML element found"))
}

fn number(token: Option<&str>, offset: usize) -> Result<f64> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GeodexError::parse(offset, "coordinate tuple needs x and y"))?;
    lexical_core::parse::<f64>(token.as_bytes())
        .map_err(|_| GeodexError::parse(offset, format!("invalid number '{token}'")))
}

/// Parse whitespace separated `x,y[,z]` tuples, as used by KML `<coordinates>` and GML2
/// `<gml:coordinates>`. Anything past y is dropped.
pub(crate) fn parse_coordinate_tuples(text: &str, offset: usize) -> Result<CoordSeq> {
    let mut values = vec![];
    for tuple in text.split_ascii_whitespace() {
        let mut parts = tuple.split(',');
        values.push(number(parts.next(), offset)?);
        values.push(number(parts.next(), offset)?);
    }
    CoordSeq::try_new(values)
}

/// Parse a flat list of whitespace separated numbers, as used by GML3 `<gml:pos>` and
/// `<gml:posList>`, keeping the first two of every `dims` values.
pub(crate) fn parse_position_list(text: &str, dims: usize, offset: usize) -> Result<CoordSeq> {
    if dims < 2 {
        return Err(GeodexError::parse(
            offset,
            format!("srsDimension must be at least 2, got {dims}"),
        ));
    }
    let numbers = text
        .split_ascii_whitespace()
        .map(|token| number(Some(token), offset))
        .collect::<Result<Vec<_>>>()?;
    if numbers.len() % dims != 0 {
        return Err(GeodexError::parse(
            offset,
            format!(
                "{} values do not divide into {dims}-dimensional positions",
                numbers.len()
            ),
        ));
    }
    CoordSeq::try_new(
        numbers
            .chunks_exact(dims)
            .flat_map(|chunk| [chunk[0], chunk[1]])
            .collect(),
    )
}

//! Element tree and its textual XML form.

use crate::{CodecError, CodecOptions};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

/// One element of an encoded document.
///
/// Elements carry either text or child elements. The codec never emits
/// attributes; every property is a named child element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Text content; an element without text reads as the empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn first_child(&self) -> Option<&Element> {
        self.children.first()
    }

    /// Write the element as an XML string.
    ///
    /// With `indent` set, every element starts on its own line, indented by
    /// that many spaces per level.
    pub fn to_xml(&self, indent: Option<usize>) -> Result<String, CodecError> {
        let mut writer = match indent {
            Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
            None => Writer::new(Vec::new()),
        };
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }

    /// Parse an XML string with exactly one root element, nested no deeper
    /// than [`CodecOptions::element_depth`] of the default options.
    ///
    /// Whitespace between child elements is dropped; text of leaf elements
    /// is kept verbatim.
    pub fn parse(input: &str) -> Result<Element, CodecError> {
        Self::parse_with_limit(input, CodecOptions::default().element_depth())
    }

    /// Parse like [`Element::parse`], failing with `DepthLimitExceeded` once
    /// elements nest deeper than `max_depth`.
    pub fn parse_with_limit(input: &str, max_depth: usize) -> Result<Element, CodecError> {
        let mut reader = Reader::from_str(input);
        let mut open: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => {
                    if open.len() >= max_depth {
                        return Err(CodecError::DepthLimitExceeded { limit: max_depth });
                    }
                    open.push(Element::new(element_name(&start)?));
                }
                Event::Empty(start) => {
                    if open.len() >= max_depth {
                        return Err(CodecError::DepthLimitExceeded { limit: max_depth });
                    }
                    let element = Element::new(element_name(&start)?);
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| CodecError::Xml("unexpected closing tag".into()))?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(xml_error)?;
                    append_text(&mut open, &text)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(xml_error)?;
                    append_text(&mut open, &text)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes.
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(CodecError::Xml(format!("unclosed element <{}>", unclosed.name)));
        }
        root.ok_or_else(|| CodecError::Xml("document has no root element".into()))
    }
}

enum Step<'a> {
    Open(&'a Element),
    Close(&'a str),
}

// Iterative so that writing never recurses per nesting level.
fn write_element(writer: &mut Writer<Vec<u8>>, root: &Element) -> Result<(), CodecError> {
    let mut steps = vec![Step::Open(root)];

    while let Some(step) = steps.pop() {
        let element = match step {
            Step::Open(element) => element,
            Step::Close(name) => {
                write_event(writer, Event::End(BytesEnd::new(name)))?;
                continue;
            }
        };

        let name = element.name.as_str();
        let text = element.text.as_deref().filter(|t| !t.is_empty());
        if text.is_none() && element.children.is_empty() {
            write_event(writer, Event::Empty(BytesStart::new(name)))?;
            continue;
        }

        write_event(writer, Event::Start(BytesStart::new(name)))?;
        if let Some(text) = text {
            write_event(writer, Event::Text(BytesText::new(text)))?;
        }
        steps.push(Step::Close(name));
        steps.extend(element.children.iter().rev().map(Step::Open));
    }

    Ok(())
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), CodecError> {
    writer.write_event(event).map_err(xml_error)
}

fn xml_error(err: impl std::fmt::Display) -> CodecError {
    CodecError::Xml(err.to_string())
}

fn element_name(start: &BytesStart<'_>) -> Result<String, CodecError> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_owned)
        .map_err(xml_error)
}

fn append_text(open: &mut [Element], text: &str) -> Result<(), CodecError> {
    match open.last_mut() {
        Some(element) => {
            element.text.get_or_insert_with(String::new).push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(CodecError::Xml("text outside the root element".into())),
    }
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    mut element: Element,
) -> Result<(), CodecError> {
    // Indentation between children.
    if !element.children.is_empty() && element.text().trim().is_empty() {
        element.text = None;
    }

    match open.last_mut() {
        Some(parent) => {
            parent.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(CodecError::Xml("more than one root element".into())),
    }
}

//! Event walk shared by the reader and slice decoders.

use log::trace;
use quick_xml::{
    events::{BytesStart, Event},
    name::PrefixDeclaration,
};

use crate::value::ValueError;

use super::{FromElement, MAX_DEPTH};

/// A source of XML events, either borrowed from a slice or read into a buffer.
pub(super) trait Events {
    fn next_event(&mut self) -> quick_xml::Result<Event<'_>>;
}

/// Errors raised by the walk. Each decoder maps these onto its own error type.
#[derive(Debug)]
pub(super) enum Failure {
    Xml(quick_xml::Error),
    Value { name: String, source: ValueError },
    Eof(String),
    TooDeep(String),
}

impl From<quick_xml::Error> for Failure {
    fn from(value: quick_xml::Error) -> Self {
        Failure::Xml(value)
    }
}

/// Decode a whole document into a receiver standing for the document itself.
pub(super) fn decode_document(src: &mut impl Events, o: &mut dyn FromElement) -> Result<(), Failure> {
    decode_element(src, o, None, 0)
}

enum Step<'o> {
    Open(String, Option<&'o mut dyn FromElement>),
    Close,
    Eof,
    Next,
}

/// Decode the children of an element (or of the document, when `name` is
/// `None`) into its receiver, up to the element's end tag.
///
/// Recursion only follows receivers. Subtrees without one are walked by
/// [`skip_element`].
fn decode_element(
    src: &mut impl Events,
    o: &mut dyn FromElement,
    name: Option<&str>,
    depth: usize,
) -> Result<(), Failure> {
    loop {
        let step = match src.next_event()? {
            Event::Start(e) => {
                let tag = local_name(&e);
                let mut child = o.add_element(&tag);

                if let Some(child) = child.as_deref_mut() {
                    add_attributes(&e, child)?;
                }

                Step::Open(tag, child)
            }
            Event::Empty(e) => {
                if let Some(child) = o.add_element(&local_name(&e)) {
                    add_attributes(&e, child)?;
                }

                Step::Next
            }
            Event::End(_) => Step::Close,
            Event::Eof => Step::Eof,
            _ => Step::Next,
        };

        match step {
            Step::Open(tag, _) if depth >= MAX_DEPTH => return Err(Failure::TooDeep(tag)),
            Step::Open(tag, Some(child)) => decode_element(src, child, Some(&tag), depth + 1)?,
            Step::Open(tag, None) => {
                let text = skip_element(src, &tag, depth + 1)?;

                if text.is_empty() {
                    trace!("Skipped element {tag}.");
                } else {
                    o.add_value(&tag, &text)
                        .map_err(|source| Failure::Value { name: tag, source })?;
                }
            }
            Step::Close => return Ok(()),
            Step::Eof => {
                return match name {
                    Some(name) => Err(Failure::Eof(name.to_string())),
                    None => Ok(()),
                };
            }
            Step::Next => {}
        }
    }
}

/// Walk past the content of an element without a receiver, returning the text
/// directly inside it. `depth` is the depth of the element itself.
fn skip_element(src: &mut impl Events, name: &str, depth: usize) -> Result<String, Failure> {
    let mut text = String::new();
    let mut nested = 0;

    loop {
        match src.next_event()? {
            Event::Start(e) => {
                nested += 1;

                if depth + nested > MAX_DEPTH {
                    return Err(Failure::TooDeep(local_name(&e)));
                }
            }
            Event::End(_) if nested == 0 => return Ok(text),
            Event::End(_) => nested -= 1,
            Event::Text(e) if nested == 0 => text.push_str(&e.unescape()?),
            Event::CData(e) if nested == 0 => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => return Err(Failure::Eof(name.to_string())),
            _ => {}
        }
    }
}

/// Publish the attributes of a start tag to a receiver.
///
/// The namespace declaration binding the element's own prefix (or the default
/// namespace, for an unprefixed element) is published as `xmlns`. Other
/// declarations are dropped.
fn add_attributes(e: &BytesStart, o: &mut dyn FromElement) -> Result<(), Failure> {
    let prefix = e.name().prefix();

    for attribute in e.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;

        let name = match attribute.key.as_namespace_binding() {
            None => String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned(),
            Some(binding) => {
                let own = match (binding, prefix) {
                    (PrefixDeclaration::Default, None) => true,
                    (PrefixDeclaration::Named(declared), Some(prefix)) => {
                        declared == prefix.into_inner()
                    }
                    _ => false,
                };

                if !own {
                    continue;
                }

                String::from("xmlns")
            }
        };

        let value = attribute.unescape_value()?;

        o.add_attribute(&name, &value)
            .map_err(|source| Failure::Value { name, source })?;
    }

    Ok(())
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

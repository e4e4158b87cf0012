//! Slice-based decoder implementation.

use quick_xml::{Reader, events::Event};
use thiserror::Error;

use crate::value::ValueError;

use super::{
    FromElement,
    walk::{self, Events, Failure},
};

/// Errors occurring while decoding from a slice.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed XML.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    /// Text of an element or attribute could not be converted.
    #[error("Invalid content for {name}: {source}")]
    Value { name: String, source: ValueError },
    /// Unexpectedly reached the end of the slice inside an element.
    #[error("Unexpectedly reached the end of the slice inside {0}.")]
    EndOfSlice(String),
    /// Elements are nested deeper than [`MAX_DEPTH`](super::MAX_DEPTH).
    #[error("Elements are nested too deeply at {0}.")]
    TooDeep(String),
}

impl Error {
    fn from_walk(value: Failure) -> Self {
        match value {
            Failure::Xml(e) => Error::Xml(e),
            Failure::Value { name, source } => Error::Value { name, source },
            Failure::Eof(name) => Error::EndOfSlice(name),
            Failure::TooDeep(name) => Error::TooDeep(name),
        }
    }
}

// Events borrow from the slice, so no buffer is needed.
impl Events for Reader<&[u8]> {
    fn next_event(&mut self) -> quick_xml::Result<Event<'_>> {
        self.read_event()
    }
}

/// Decode a document from a slice, publishing to a receiver.
///
/// The receiver stands for the document itself: the root element is its only
/// child.
///
/// This method is also re-exported as `chainring::avec::decode_slice`.
pub fn decode(r: &[u8], o: &mut impl FromElement) -> Result<(), Error> {
    let mut reader = Reader::from_reader(r);
    reader.trim_text(true);

    walk::decode_document(&mut reader, o).map_err(Error::from_walk)?;

    Ok(())
}

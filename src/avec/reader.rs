//! Reader-based decoder implementation.

use std::io::BufRead;

use quick_xml::{Reader, events::Event};
use thiserror::Error;

use crate::value::ValueError;

use super::{
    FromElement,
    walk::{self, Events, Failure},
};

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed XML, or an error from the supplied reader.
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    /// Text of an element or attribute could not be converted.
    #[error("Invalid content for {name}: {source}")]
    Value { name: String, source: ValueError },
    /// The reader ended inside an element.
    #[error("Unexpectedly reached the end of the document inside {0}.")]
    UnexpectedEof(String),
    /// Elements are nested deeper than [`MAX_DEPTH`](super::MAX_DEPTH).
    #[error("Elements are nested too deeply at {0}.")]
    TooDeep(String),
}

impl Error {
    fn from_walk(value: Failure) -> Self {
        match value {
            Failure::Xml(e) => Error::Xml(e),
            Failure::Value { name, source } => Error::Value { name, source },
            Failure::Eof(name) => Error::UnexpectedEof(name),
            Failure::TooDeep(name) => Error::TooDeep(name),
        }
    }
}

/// Events read into a buffer, reused across reads.
struct Buffered<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> Events for Buffered<R> {
    fn next_event(&mut self) -> quick_xml::Result<Event<'_>> {
        self.buf.clear();
        self.reader.read_event_into(&mut self.buf)
    }
}

/// Decode a document from a reader, publishing to a receiver.
///
/// The receiver stands for the document itself: the root element is its only
/// child.
///
/// This method is also re-exported as `chainring::avec::decode_reader`.
pub fn decode(r: &mut impl BufRead, o: &mut impl FromElement) -> Result<(), Error> {
    let mut reader = Reader::from_reader(r);
    reader.trim_text(true);

    let mut events = Buffered {
        reader,
        buf: Vec::new(),
    };

    walk::decode_document(&mut events, o).map_err(Error::from_walk)?;

    Ok(())
}

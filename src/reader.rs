//! Reading activity files into a [`TrainingCenterDatabase`].

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, warn};
use thiserror::Error;

use crate::{
    avec::{reader, slice},
    schema::{self, SchemaError, TcxDocument, TrainingCenterDatabase},
};

/// Errors occurring while reading an activity file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file could not be opened.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The document could not be decoded from a reader.
    #[error("Error decoding document: {0}")]
    Decode(#[from] reader::Error),
    /// The document could not be decoded from a slice.
    #[error("Error decoding document: {0}")]
    Slice(#[from] slice::Error),
    /// The document has no `TrainingCenterDatabase` root element.
    #[error("Document has no TrainingCenterDatabase element.")]
    MissingRoot,
    /// The document violates a constraint of the format.
    #[error("Invalid document: {0}")]
    Schema(#[from] SchemaError),
}

/// Reader for Training Center Database files.
///
/// ```
/// let database = TcxReader::new().validating(true).read("morning-run.tcx")?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TcxReader {
    validating: bool,
}

impl TcxReader {
    /// Create a non-validating reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether to check decoded documents against the constraints of the
    /// format. See [`schema::validate`].
    pub fn validating(mut self, validating: bool) -> Self {
        self.validating = validating;
        self
    }

    pub fn is_validating(&self) -> bool {
        self.validating
    }

    /// Read a document from a file.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<TrainingCenterDatabase, ReadError> {
        let path = path.as_ref();
        debug!("Reading {}.", path.display());

        let mut file = BufReader::new(File::open(path)?);
        self.read_from(&mut file)
    }

    /// Read a document from a buffered reader.
    pub fn read_from(&self, r: &mut impl BufRead) -> Result<TrainingCenterDatabase, ReadError> {
        let mut document = TcxDocument::default();
        reader::decode(r, &mut document)?;
        self.finish(document)
    }

    /// Read a document from a slice.
    pub fn read_slice(&self, r: &[u8]) -> Result<TrainingCenterDatabase, ReadError> {
        let mut document = TcxDocument::default();
        slice::decode(r, &mut document)?;
        self.finish(document)
    }

    fn finish(&self, document: TcxDocument) -> Result<TrainingCenterDatabase, ReadError> {
        let database = document.database.ok_or(ReadError::MissingRoot)?;

        debug!(
            "Decoded {} activities.",
            database.activities.as_ref().map_or(0, |a| a.activities.len())
        );

        if self.validating {
            schema::validate(&database).inspect_err(|e| warn!("Validation failed: {e}"))?;
        }

        Ok(database)
    }
}

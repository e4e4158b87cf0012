//! A decoder for Garmin's Training Center Database (TCX) activity files, with
//! derived track metrics.
//!
//! Chainring decodes documents into the typed tree of the [`schema`] module,
//! optionally checking it against the constraints of the format, and builds
//! [`Track`](track::Track)s whose points carry the speed between consecutive
//! samples.
//!
//! Most users should begin with [`TcxReader`](reader::TcxReader) and
//! [`Track::from_database`](track::Track::from_database). To decode other
//! documents, or only part of one, implement or derive a receiver as described
//! in the [`avec`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: re-export the derive macro for receivers (default).
//! - `cli`: build the `chainring` command-line tool (default).

// Lets derived receivers inside this crate name it by its external path.
extern crate self as chainring;

pub mod avec;
pub mod reader;
pub mod schema;
pub mod track;
pub mod value;

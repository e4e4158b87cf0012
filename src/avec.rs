//! Convenience interfaces for decoding documents into receivers.
//!
//! The functions in this module walk a document from a reader or a slice,
//! publishing its elements, values, and attributes to the [`FromElement`]
//! trait.
//!
//! In most cases (when the shape of the document is known), this trait can be
//! derived. See the [`FromElement`](macro@FromElement) macro for details, and
//! the [`crate::schema`] module for the types covering activity files.

pub mod reader;
pub mod slice;
mod walk;

pub use reader::decode as decode_reader;
pub use slice::decode as decode_slice;

use crate::value::ValueError;

/// Deepest element nesting either decoder accepts, counting the root element
/// as depth one. Deeper documents fail with a `TooDeep` error.
pub const MAX_DEPTH: usize = 256;

/// Derive [`FromElement`] for a struct representing an element.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a child element, add the `element("Name")` attribute to an
/// `Option<T>` struct field, where `T` is a type implementing [`FromElement`]
/// and [`Default`]. Additional elements with the same name will overwrite
/// earlier ones. To collect every occurrence, apply the attribute to a `Vec<T>`
/// instead.
///
/// ```
/// #[derive(Debug, Default, FromElement)]
/// struct Document {
///     #[element("TrainingCenterDatabase")]
///     database: Option<Database>,
/// }
///
/// #[derive(Debug, Default, FromElement)]
/// struct Track {
///     #[element("Trackpoint")]
///     points: Vec<Point>,
/// }
/// ```
///
/// To receive the text of a leaf element, add the `value("Name")` attribute to
/// an `Option<T>` struct field, where `T` implements [`Value`]. Attributes of
/// the element itself are received the same way with `attribute("Name")`.
///
/// ```
/// #[derive(Debug, Default, FromElement)]
/// struct Lap {
///     #[attribute("StartTime")]
///     start_time: Option<DateTime<FixedOffset>>,
///     #[value("TotalTimeSeconds")]
///     total_time_seconds: Option<f64>,
/// }
/// ```
///
/// To accumulate values or convert them on arrival, supply a closure. Since
/// the value type cannot be inferred, the second argument must be typed.
///
/// ```
/// #[derive(Debug, Default, FromElement)]
/// struct Track {
///     #[value("Time", |v, t: DateTime<FixedOffset>| v.push(t))]
///     times: Vec<DateTime<FixedOffset>>,
/// }
/// ```
///
/// [`Value`]: crate::value::Value
#[cfg(feature = "derive")]
pub use chainring_derive::FromElement;

/// Receive the content of an element.
///
/// Decoders call [`add_element`](FromElement::add_element) on reaching a start
/// tag. If a receiver is returned, the element's attributes are published to
/// it and its children are decoded into it. Otherwise, the element is treated
/// as a leaf, and its text is published to the current receiver through
/// [`add_value`](FromElement::add_value). Names are local names, without any
/// namespace prefix. Of an element's namespace declarations, only the one
/// binding its own prefix is published, as the attribute `xmlns`.
///
/// The default implementation of each method ignores received content.
///
/// See the [`FromElement`](macro@FromElement) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromElement {
    /// Retrieve a receiver for a child element, if one exists.
    fn add_element(&mut self, name: &str) -> Option<&mut dyn FromElement> {
        None
    }
    /// Add the text of a leaf child element.
    fn add_value(&mut self, name: &str, text: &str) -> Result<(), ValueError> {
        Ok(())
    }
    /// Add an attribute of this element.
    fn add_attribute(&mut self, name: &str, text: &str) -> Result<(), ValueError> {
        Ok(())
    }
}

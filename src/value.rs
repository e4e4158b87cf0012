//! Conversions from element text to Rust primitives.
//!
//! Receivers are handed the trimmed, unescaped text of each leaf element and
//! attribute. Types implementing [`Value`] describe how that text becomes a
//! typed value, following the lexical rules of the XML Schema built-in types
//! used by the format (`xsd:double`, `xsd:unsignedByte`, `xsd:dateTime`, ...).

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use thiserror::Error;

/// An error converting element text to a value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// Text is not a number of the expected type.
    #[error("Invalid number ({0:?}).")]
    Number(String),
    /// Text is not a boolean.
    #[error("Invalid boolean ({0:?}).")]
    Boolean(String),
    /// Text is not a date and time.
    #[error("Invalid date and time ({0:?}).")]
    DateTime(String),
    /// Text is not one of the values of an enumeration.
    #[error("Unknown enumeration value ({0:?}).")]
    Enumeration(String),
}

/// Parse a value from the text of an element or attribute.
pub trait Value: Sized {
    /// Convert the text, which has already been trimmed and unescaped.
    fn parse(text: &str) -> Result<Self, ValueError>;
}

macro_rules! impl_number {
    ($($t:ty),+) => {
        $(
            impl Value for $t {
                fn parse(text: &str) -> Result<Self, ValueError> {
                    text.parse().map_err(|_| ValueError::Number(text.to_string()))
                }
            }
        )+
    };
}

impl_number!(u8, u16, u32, i32, f32, f64);

impl Value for bool {
    fn parse(text: &str) -> Result<Self, ValueError> {
        match text {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ValueError::Boolean(text.to_string())),
        }
    }
}

impl Value for String {
    fn parse(text: &str) -> Result<Self, ValueError> {
        Ok(text.to_string())
    }
}

/// Times without a zone designator are read as UTC.
impl Value for DateTime<FixedOffset> {
    fn parse(text: &str) -> Result<Self, ValueError> {
        if let Ok(time) = DateTime::parse_from_rfc3339(text) {
            return Ok(time);
        }

        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc.fix()))
            .map_err(|_| ValueError::DateTime(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(u8::parse("142"), Ok(142));
        assert_eq!(u8::parse("256"), Err(ValueError::Number("256".into())));
        assert_eq!(f64::parse("-12.5"), Ok(-12.5));
        assert_eq!(f64::parse("1e3"), Ok(1000.0));
        assert!(f64::parse("INF").unwrap().is_infinite());
        assert_eq!(u16::parse("abc"), Err(ValueError::Number("abc".into())));
    }

    #[test]
    fn booleans() {
        assert_eq!(bool::parse("1"), Ok(true));
        assert_eq!(bool::parse("false"), Ok(false));
        assert_eq!(bool::parse("yes"), Err(ValueError::Boolean("yes".into())));
    }

    #[test]
    fn zulu_time() {
        let time = DateTime::<FixedOffset>::parse("2019-01-05T15:28:51Z").unwrap();
        assert_eq!(time, Utc.with_ymd_and_hms(2019, 1, 5, 15, 28, 51).unwrap());
        assert_eq!(time.offset().local_minus_utc(), 0);
    }

    #[test]
    fn offset_time_keeps_offset() {
        let time = DateTime::<FixedOffset>::parse("2019-01-05T10:28:51.250-05:00").unwrap();
        assert_eq!(time.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(time.hour(), 10);
        assert_eq!(time.timestamp_millis(), 1_546_702_131_250);
    }

    #[test]
    fn local_time_is_utc() {
        let time = DateTime::<FixedOffset>::parse("2019-01-05T15:28:51").unwrap();
        assert_eq!(time.offset().local_minus_utc(), 0);
        assert_eq!(time.timestamp(), 1_546_702_131);
    }

    #[test]
    fn invalid_time() {
        assert_eq!(
            DateTime::<FixedOffset>::parse("yesterday"),
            Err(ValueError::DateTime("yesterday".into()))
        );
    }
}

//! Track points enriched with derived metrics.
//!
//! A [`Track`] is built from the raw points of a decoded track. Each output
//! point carries the raw fields along with the average speed since the
//! previous point, and offers imperial projections of its measurements.
//!
//! ```
//! let database = TcxReader::new().read("morning-run.tcx")?;
//! let track = Track::from_database(&database)?;
//!
//! for point in &track.points {
//!     println!("{}", point.imperial());
//! }
//! ```

use std::{cmp::Ordering, fmt, iter};

use chrono::{DateTime, FixedOffset, SecondsFormat};
use thiserror::Error;

use crate::schema::{self, TrainingCenterDatabase};

pub const FEET_PER_METER: f64 = 3.28084;
pub const MILES_PER_KILOMETER: f64 = 0.621371;

/// Read access to the fields of a recorded sample.
///
/// Each field may be absent from a sample, but all of them are required to
/// build a [`Track`].
pub trait RawTrackPoint {
    fn time(&self) -> Option<DateTime<FixedOffset>>;
    /// Latitude and longitude, in degrees.
    fn position(&self) -> Option<(f64, f64)>;
    fn altitude_meters(&self) -> Option<f64>;
    /// Distance travelled since the start of the track.
    fn distance_meters(&self) -> Option<f64>;
    fn heart_rate_bpm(&self) -> Option<u8>;
}

impl RawTrackPoint for schema::Trackpoint {
    fn time(&self) -> Option<DateTime<FixedOffset>> {
        self.time
    }

    fn position(&self) -> Option<(f64, f64)> {
        let position = self.position.as_ref()?;
        Some((position.latitude_degrees?, position.longitude_degrees?))
    }

    fn altitude_meters(&self) -> Option<f64> {
        self.altitude_meters
    }

    fn distance_meters(&self) -> Option<f64> {
        self.distance_meters
    }

    fn heart_rate_bpm(&self) -> Option<u8> {
        self.heart_rate.as_ref()?.value
    }
}

/// A field of a raw track point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Time,
    Position,
    Altitude,
    Distance,
    HeartRate,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Time => "time",
            Field::Position => "position",
            Field::Altitude => "altitude",
            Field::Distance => "distance",
            Field::HeartRate => "heart rate",
        })
    }
}

/// Errors occurring while building a track.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    /// A raw point lacks a field needed to build the track.
    #[error("Track point {index} is missing its {field}.")]
    MissingField { index: usize, field: Field },
}

/// A sample of a track, with its speed since the previous sample.
///
/// Points compare equal when every field is equal (including the offset of
/// the timestamp), but are ordered by timestamp alone.
#[derive(Debug, Clone)]
pub struct TrackPoint {
    timestamp: DateTime<FixedOffset>,
    latitude_degrees: f64,
    longitude_degrees: f64,
    altitude_meters: f64,
    distance_meters: f64,
    heart_rate_bpm: u8,
    speed_kilometers_per_hour: f64,
}

impl TrackPoint {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        latitude_degrees: f64,
        longitude_degrees: f64,
        altitude_meters: f64,
        distance_meters: f64,
        heart_rate_bpm: u8,
        speed_kilometers_per_hour: f64,
    ) -> Self {
        Self {
            timestamp,
            latitude_degrees,
            longitude_degrees,
            altitude_meters,
            distance_meters,
            heart_rate_bpm,
            speed_kilometers_per_hour,
        }
    }

    /// Copy the fields of a raw point, failing on the first absent one.
    ///
    /// The speed is left at zero.
    fn from_raw(index: usize, point: &impl RawTrackPoint) -> Result<Self, TrackError> {
        let missing = |field| TrackError::MissingField { index, field };

        let timestamp = point.time().ok_or(missing(Field::Time))?;
        let (latitude_degrees, longitude_degrees) =
            point.position().ok_or(missing(Field::Position))?;
        let altitude_meters = point.altitude_meters().ok_or(missing(Field::Altitude))?;
        let distance_meters = point.distance_meters().ok_or(missing(Field::Distance))?;
        let heart_rate_bpm = point.heart_rate_bpm().ok_or(missing(Field::HeartRate))?;

        Ok(Self::new(
            timestamp,
            latitude_degrees,
            longitude_degrees,
            altitude_meters,
            distance_meters,
            heart_rate_bpm,
            0.0,
        ))
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude_degrees
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude_degrees
    }

    pub fn altitude_meters(&self) -> f64 {
        self.altitude_meters
    }

    pub fn altitude_feet(&self) -> f64 {
        self.altitude_meters * FEET_PER_METER
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn distance_feet(&self) -> f64 {
        self.distance_meters * FEET_PER_METER
    }

    pub fn heart_rate_bpm(&self) -> u8 {
        self.heart_rate_bpm
    }

    /// Average speed since the previous point, or zero for the first point of
    /// a track.
    ///
    /// Negative when the recorded distance decreased, and non-finite when the
    /// previous point has the same timestamp.
    pub fn speed_kilometers_per_hour(&self) -> f64 {
        self.speed_kilometers_per_hour
    }

    pub fn speed_miles_per_hour(&self) -> f64 {
        self.speed_kilometers_per_hour * MILES_PER_KILOMETER
    }

    /// Compare two points by the instant they were recorded.
    pub fn cmp_by_time(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }

    /// Display the point in feet and miles per hour.
    pub fn imperial(&self) -> Imperial<'_> {
        Imperial(self)
    }

    fn write(
        &self,
        f: &mut fmt::Formatter<'_>,
        altitude: f64,
        distance: f64,
        speed: f64,
    ) -> fmt::Result {
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);

        write!(
            f,
            "{{\n\t{timestamp}\n\t{:.6}, {:.6}\n\t{altitude:.6}\n\t{distance:.6}\n\t{}\n\t{speed:.6}\n}}",
            self.latitude_degrees, self.longitude_degrees, self.heart_rate_bpm,
        )
    }
}

impl PartialEq for TrackPoint {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.timestamp.offset() == other.timestamp.offset()
            && self.latitude_degrees == other.latitude_degrees
            && self.longitude_degrees == other.longitude_degrees
            && self.altitude_meters == other.altitude_meters
            && self.distance_meters == other.distance_meters
            && self.heart_rate_bpm == other.heart_rate_bpm
            && self.speed_kilometers_per_hour == other.speed_kilometers_per_hour
    }
}

/// Orders points by timestamp alone.
///
/// This is not consistent with [`PartialEq`]: two points at the same instant
/// compare as `Equal` even when their other fields (or their offsets) differ,
/// so `a.partial_cmp(&b) == Some(Equal)` does not imply `a == b`. Use
/// [`TrackPoint::cmp_by_time`] as a total order for sorting.
impl PartialOrd for TrackPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_by_time(other))
    }
}

/// Metric rendering: meters and kilometers per hour.
impl fmt::Display for TrackPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(
            f,
            self.altitude_meters,
            self.distance_meters,
            self.speed_kilometers_per_hour,
        )
    }
}

/// Imperial rendering of a [`TrackPoint`]: feet and miles per hour.
#[derive(Debug, Clone, Copy)]
pub struct Imperial<'a>(&'a TrackPoint);

impl fmt::Display for Imperial<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = self.0;
        point.write(
            f,
            point.altitude_feet(),
            point.distance_feet(),
            point.speed_miles_per_hour(),
        )
    }
}

/// The enriched points of a track, in recorded order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub points: Vec<TrackPoint>,
}

impl Track {
    /// Build a track from raw points. See [`build`].
    pub fn new<P: RawTrackPoint>(points: &[P]) -> Result<Self, TrackError> {
        Ok(Self {
            points: build(points)?,
        })
    }

    /// Build a track from a decoded track, which may be absent.
    pub fn from_track(track: Option<&schema::Track>) -> Result<Self, TrackError> {
        match track {
            Some(track) => Self::new(&track.trackpoints),
            None => Ok(Self::default()),
        }
    }

    /// Build a track from the first track of the first lap of the first
    /// activity in a document. A document without one gives an empty track.
    pub fn from_database(database: &TrainingCenterDatabase) -> Result<Self, TrackError> {
        Self::from_track(database.first_track())
    }
}

/// Enrich raw points with the speed between consecutive points.
///
/// Fewer than two points give an empty result, since no speed can be derived
/// from them. Otherwise, there is one output point per input point, in the
/// same order, and the first has a speed of zero. Every point must have every
/// field, or the first absent field is reported.
pub fn build<P: RawTrackPoint>(points: &[P]) -> Result<Vec<TrackPoint>, TrackError> {
    if points.len() < 2 {
        return Ok(Vec::new());
    }

    let points = points
        .iter()
        .enumerate()
        .map(|(i, point)| TrackPoint::from_raw(i, point))
        .collect::<Result<Vec<_>, _>>()?;

    let speeds = iter::once(0.0)
        .chain(points.windows(2).map(|w| speed_kilometers_per_hour(&w[0], &w[1])))
        .collect::<Vec<_>>();

    Ok(points
        .into_iter()
        .zip(speeds)
        .map(|(point, speed_kilometers_per_hour)| TrackPoint {
            speed_kilometers_per_hour,
            ..point
        })
        .collect())
}

/// Average speed between two points, from their distance and time deltas.
fn speed_kilometers_per_hour(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let delta_distance_meters = b.distance_meters - a.distance_meters;
    let delta_time_milliseconds =
        (b.timestamp.timestamp_millis() - a.timestamp.timestamp_millis()) as f64;

    let delta_distance_kilometers = delta_distance_meters / 1000.0;
    let delta_time_hours = delta_time_milliseconds
        / 1000.0 // Milliseconds in a second.
        / 60.0 // Seconds in a minute.
        / 60.0; // Minutes in an hour.

    delta_distance_kilometers / delta_time_hours
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    #[derive(Debug, Clone, Default)]
    struct Sample {
        time: Option<DateTime<FixedOffset>>,
        position: Option<(f64, f64)>,
        altitude: Option<f64>,
        distance: Option<f64>,
        heart_rate: Option<u8>,
    }

    impl RawTrackPoint for Sample {
        fn time(&self) -> Option<DateTime<FixedOffset>> {
            self.time
        }
        fn position(&self) -> Option<(f64, f64)> {
            self.position
        }
        fn altitude_meters(&self) -> Option<f64> {
            self.altitude
        }
        fn distance_meters(&self) -> Option<f64> {
            self.distance
        }
        fn heart_rate_bpm(&self) -> Option<u8> {
            self.heart_rate
        }
    }

    fn start() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2019, 1, 5, 15, 28, 51)
            .unwrap()
            .fixed_offset()
    }

    fn sample(milliseconds: i64, distance: f64) -> Sample {
        Sample {
            time: Some(start() + Duration::milliseconds(milliseconds)),
            position: Some((47.6, -122.3)),
            altitude: Some(100.0),
            distance: Some(distance),
            heart_rate: Some(120),
        }
    }

    #[test]
    fn empty() {
        assert_eq!(build::<Sample>(&[]), Ok(vec![]));
        assert_eq!(Track::from_track(None), Ok(Track::default()));
    }

    #[test]
    fn single_point_is_discarded() {
        assert_eq!(build(&[sample(0, 0.0)]), Ok(vec![]));
    }

    #[test]
    fn single_point_is_not_read() {
        assert_eq!(build(&[Sample::default()]), Ok(vec![]));
    }

    #[test]
    fn ten_kilometers_in_an_hour() {
        let points = build(&[sample(0, 0.0), sample(3_600_000, 10_000.0)]).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].speed_kilometers_per_hour(), 0.0);
        assert_eq!(points[1].speed_kilometers_per_hour(), 10.0);
        assert_eq!(points[1].distance_meters(), 10_000.0);
        assert_eq!(points[1].timestamp(), start() + Duration::hours(1));
    }

    #[test]
    fn first_point_has_zero_speed() {
        let points = build(&[sample(0, 500.0), sample(1_000, 510.0), sample(2_000, 530.0)]).unwrap();

        assert_eq!(points[0].speed_kilometers_per_hour(), 0.0);
        assert_eq!(points[1].speed_kilometers_per_hour(), 36.0);
        assert_eq!(points[2].speed_kilometers_per_hour(), 72.0);
    }

    #[test]
    fn speed_formula() {
        let raw = [
            sample(0, 0.0),
            sample(4_321, 13.7),
            sample(9_876, 29.05),
            sample(15_002, 40.0),
        ];
        let points = build(&raw).unwrap();

        for i in 1..raw.len() {
            let distance = raw[i].distance.unwrap() - raw[i - 1].distance.unwrap();
            let time = (raw[i].time.unwrap() - raw[i - 1].time.unwrap()).num_milliseconds();
            let expected = (distance / 1000.0) / (time as f64 / 3_600_000.0);

            assert!((points[i].speed_kilometers_per_hour() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn decreasing_distance_gives_negative_speed() {
        let points = build(&[sample(0, 1_000.0), sample(3_600_000, 500.0)]).unwrap();
        assert_eq!(points[1].speed_kilometers_per_hour(), -0.5);
    }

    #[test]
    fn equal_timestamps_give_infinite_speed() {
        let points = build(&[sample(0, 0.0), sample(0, 5.0), sample(0, 0.0), sample(0, 0.0)]).unwrap();

        assert_eq!(points[1].speed_kilometers_per_hour(), f64::INFINITY);
        assert_eq!(points[2].speed_kilometers_per_hour(), f64::NEG_INFINITY);
        assert!(points[3].speed_kilometers_per_hour().is_nan());
    }

    #[test]
    fn missing_field() {
        let mut raw = vec![sample(0, 0.0), sample(1_000, 5.0), sample(2_000, 10.0)];
        raw[1].altitude = None;
        raw[2].time = None;

        assert_eq!(
            build(&raw),
            Err(TrackError::MissingField {
                index: 1,
                field: Field::Altitude
            })
        );
    }

    #[test]
    fn conversions() {
        let point = TrackPoint::new(start(), 0.0, 0.0, 100.0, 1_000.0, 120, 10.0);

        assert_eq!(point.altitude_feet(), 100.0 * 3.28084);
        assert_eq!(point.altitude_feet(), 328.084);
        assert_eq!(point.distance_feet(), 1_000.0 * 3.28084);
        assert_eq!(point.speed_miles_per_hour(), 10.0 * 0.621371);
    }

    #[test]
    fn idempotent() {
        let raw = [sample(0, 0.0), sample(1_500, 4.0), sample(3_000, 9.0)];
        assert_eq!(build(&raw), build(&raw));
    }

    #[test]
    fn preserves_order() {
        let raw = (0..10)
            .map(|i| sample(i * 1_000, i as f64 * 3.0))
            .collect::<Vec<_>>();
        let points = build(&raw).unwrap();

        assert_eq!(points.len(), raw.len());
        assert!(points.windows(2).all(|w| w[0] < w[1]));

        for (point, raw) in points.iter().zip(&raw) {
            assert_eq!(Some(point.timestamp()), raw.time);
        }
    }

    #[test]
    fn equality_includes_offset() {
        let a = TrackPoint::new(start(), 1.0, 2.0, 3.0, 4.0, 5, 6.0);
        let shifted = start().with_timezone(&FixedOffset::east_opt(3600).unwrap());
        let b = TrackPoint::new(shifted, 1.0, 2.0, 3.0, 4.0, 5, 6.0);

        assert_eq!(a.clone(), a);
        assert_ne!(a, b);
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Equal));
    }

    #[test]
    fn ordering_ignores_other_fields() {
        let a = TrackPoint::new(start(), 1.0, 2.0, 3.0, 4.0, 5, 6.0);
        let b = TrackPoint::new(start() + Duration::seconds(1), 0.0, 0.0, 0.0, 0.0, 1, 0.0);

        assert!(a < b);
    }

    #[test]
    fn sort_by_time() {
        let late = TrackPoint::new(start() + Duration::seconds(2), 0.0, 0.0, 0.0, 0.0, 1, 0.0);
        let early = TrackPoint::new(start(), 1.0, 2.0, 3.0, 4.0, 5, 6.0);
        let shifted = start().with_timezone(&FixedOffset::east_opt(3600).unwrap());
        let same = TrackPoint::new(shifted, 1.0, 2.0, 3.0, 4.0, 5, 6.0);

        let mut points = vec![late.clone(), early.clone(), same.clone()];
        points.sort_by(TrackPoint::cmp_by_time);

        // Stable: points at the same instant keep their relative order.
        assert_eq!(points, [early.clone(), same.clone(), late]);
        assert_eq!(early.cmp_by_time(&same), Ordering::Equal);
        assert_ne!(early, same);
    }

    #[test]
    fn display() {
        let point = TrackPoint::new(start(), 47.6, -122.3, 100.0, 1_000.0, 120, 10.0);

        assert_eq!(
            point.to_string(),
            "{\n\t2019-01-05T15:28:51Z\n\t47.600000, -122.300000\n\t100.000000\n\t1000.000000\n\t120\n\t10.000000\n}"
        );
        assert_eq!(
            point.imperial().to_string(),
            "{\n\t2019-01-05T15:28:51Z\n\t47.600000, -122.300000\n\t328.084000\n\t3280.840000\n\t120\n\t6.213710\n}"
        );
    }
}

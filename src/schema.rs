//! Typed representation of Training Center Database (TCX v2) activity files.
//!
//! Only the activity branch of the format is covered: activities, their laps,
//! tracks, and track points. Other content (courses, workouts, extensions) is
//! skipped while decoding.
//!
//! Every element is optional in these types, whatever the format requires, so
//! that a partial document still decodes. Use [`validate`] to check a decoded
//! tree against the constraints the format places on it.

use chainring_derive::FromElement;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::value::{Value, ValueError};

/// Namespace of version 2 of the format.
pub const NAMESPACE: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";

/// A whole document, holding its root element.
#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct TcxDocument {
    #[element("TrainingCenterDatabase")]
    pub database: Option<TrainingCenterDatabase>,
}

#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct TrainingCenterDatabase {
    /// Namespace of the root element, when declared on it.
    #[attribute("xmlns")]
    pub namespace: Option<String>,
    #[element("Activities")]
    pub activities: Option<ActivityList>,
}

impl TrainingCenterDatabase {
    /// The first track of the first lap of the first activity, if any.
    pub fn first_track(&self) -> Option<&Track> {
        self.activities
            .as_ref()?
            .activities
            .first()?
            .laps
            .first()?
            .tracks
            .first()
    }
}

#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct ActivityList {
    #[element("Activity")]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct Activity {
    #[attribute("Sport")]
    pub sport: Option<Sport>,
    #[value("Id")]
    pub id: Option<DateTime<FixedOffset>>,
    #[element("Lap")]
    pub laps: Vec<ActivityLap>,
    #[value("Notes")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct ActivityLap {
    #[attribute("StartTime")]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[value("TotalTimeSeconds")]
    pub total_time_seconds: Option<f64>,
    #[value("DistanceMeters")]
    pub distance_meters: Option<f64>,
    #[value("MaximumSpeed")]
    pub maximum_speed: Option<f64>,
    #[value("Calories")]
    pub calories: Option<u16>,
    #[element("AverageHeartRateBpm")]
    pub average_heart_rate: Option<HeartRate>,
    #[element("MaximumHeartRateBpm")]
    pub maximum_heart_rate: Option<HeartRate>,
    #[value("Intensity")]
    pub intensity: Option<Intensity>,
    #[value("Cadence")]
    pub cadence: Option<u8>,
    #[value("TriggerMethod")]
    pub trigger_method: Option<TriggerMethod>,
    #[element("Track")]
    pub tracks: Vec<Track>,
    #[value("Notes")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct Track {
    #[element("Trackpoint")]
    pub trackpoints: Vec<Trackpoint>,
}

/// A single sample, as recorded by the device.
#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct Trackpoint {
    #[value("Time")]
    pub time: Option<DateTime<FixedOffset>>,
    #[element("Position")]
    pub position: Option<Position>,
    #[value("AltitudeMeters")]
    pub altitude_meters: Option<f64>,
    /// Cumulative distance since the start of the track.
    #[value("DistanceMeters")]
    pub distance_meters: Option<f64>,
    #[element("HeartRateBpm")]
    pub heart_rate: Option<HeartRate>,
    #[value("Cadence")]
    pub cadence: Option<u8>,
    #[value("SensorState")]
    pub sensor_state: Option<SensorState>,
}

#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct Position {
    #[value("LatitudeDegrees")]
    pub latitude_degrees: Option<f64>,
    #[value("LongitudeDegrees")]
    pub longitude_degrees: Option<f64>,
}

/// Heart rate in beats per minute.
#[derive(Debug, Default, Clone, PartialEq, FromElement)]
pub struct HeartRate {
    #[value("Value")]
    pub value: Option<u8>,
}

macro_rules! enumeration {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Value for $name {
            fn parse(text: &str) -> Result<Self, ValueError> {
                $(
                    if text == stringify!($variant) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(ValueError::Enumeration(text.to_string()))
            }
        }
    };
}

enumeration!(Sport {
    Running,
    Biking,
    Other
});

enumeration!(Intensity { Active, Resting });

enumeration!(
    /// What ended a lap.
    TriggerMethod {
        Manual,
        Distance,
        Location,
        Time,
        HeartRate,
    }
);

enumeration!(
    /// Whether a foot pod or other sensor was reporting.
    SensorState { Present, Absent }
);

/// A constraint of the format violated by a decoded document.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// The root element is missing or outside the TCX v2 namespace.
    #[error("Unexpected namespace ({0:?}).")]
    Namespace(Option<String>),
    /// A required element or attribute is missing.
    #[error("Missing {name} in {path}.")]
    Missing { path: String, name: &'static str },
    /// A value is outside its permitted range.
    #[error("Value of {name} in {path} is out of range ({value}).")]
    OutOfRange {
        path: String,
        name: &'static str,
        value: f64,
    },
}

/// Check a decoded tree against the constraints the format places on the
/// activity branch, returning the first violation found.
pub fn validate(database: &TrainingCenterDatabase) -> Result<(), SchemaError> {
    if database.namespace.as_deref() != Some(NAMESPACE) {
        Err(SchemaError::Namespace(database.namespace.clone()))?;
    }

    let Some(activities) = &database.activities else {
        return Ok(());
    };

    for (i, activity) in activities.activities.iter().enumerate() {
        let path = format!("Activities/Activity[{i}]");
        validate_activity(&path, activity)?;
    }

    Ok(())
}

fn validate_activity(path: &str, activity: &Activity) -> Result<(), SchemaError> {
    require(path, "Sport", &activity.sport)?;
    require(path, "Id", &activity.id)?;

    if activity.laps.is_empty() {
        Err(missing(path, "Lap"))?;
    }

    for (i, lap) in activity.laps.iter().enumerate() {
        let path = format!("{path}/Lap[{i}]");

        require(&path, "StartTime", &lap.start_time)?;
        require(&path, "TotalTimeSeconds", &lap.total_time_seconds)?;
        require(&path, "DistanceMeters", &lap.distance_meters)?;
        require(&path, "Calories", &lap.calories)?;
        require(&path, "Intensity", &lap.intensity)?;
        require(&path, "TriggerMethod", &lap.trigger_method)?;

        for heart_rate in [&lap.average_heart_rate, &lap.maximum_heart_rate]
            .into_iter()
            .flatten()
        {
            validate_heart_rate(&path, heart_rate)?;
        }

        if let Some(cadence) = lap.cadence {
            validate_cadence(&path, cadence)?;
        }

        for (j, track) in lap.tracks.iter().enumerate() {
            let path = format!("{path}/Track[{j}]");

            if track.trackpoints.is_empty() {
                Err(missing(&path, "Trackpoint"))?;
            }

            for (k, point) in track.trackpoints.iter().enumerate() {
                validate_trackpoint(&format!("{path}/Trackpoint[{k}]"), point)?;
            }
        }
    }

    Ok(())
}

fn validate_trackpoint(path: &str, point: &Trackpoint) -> Result<(), SchemaError> {
    require(path, "Time", &point.time)?;

    if let Some(position) = &point.position {
        let path = format!("{path}/Position");

        let latitude = *require(&path, "LatitudeDegrees", &position.latitude_degrees)?;
        let longitude = *require(&path, "LongitudeDegrees", &position.longitude_degrees)?;

        if !(-90.0..=90.0).contains(&latitude) {
            Err(out_of_range(&path, "LatitudeDegrees", latitude))?;
        }
        if !(-180.0..180.0).contains(&longitude) {
            Err(out_of_range(&path, "LongitudeDegrees", longitude))?;
        }
    }

    if let Some(heart_rate) = &point.heart_rate {
        validate_heart_rate(path, heart_rate)?;
    }

    if let Some(cadence) = point.cadence {
        validate_cadence(path, cadence)?;
    }

    Ok(())
}

fn validate_heart_rate(path: &str, heart_rate: &HeartRate) -> Result<(), SchemaError> {
    let value = *require(path, "Value", &heart_rate.value)?;

    if value < 1 {
        Err(out_of_range(path, "Value", value.into()))?;
    }

    Ok(())
}

fn validate_cadence(path: &str, cadence: u8) -> Result<(), SchemaError> {
    if cadence > 254 {
        Err(out_of_range(path, "Cadence", cadence.into()))?;
    }

    Ok(())
}

fn require<'a, T>(path: &str, name: &'static str, value: &'a Option<T>) -> Result<&'a T, SchemaError> {
    value.as_ref().ok_or_else(|| missing(path, name))
}

fn missing(path: &str, name: &'static str) -> SchemaError {
    SchemaError::Missing {
        path: path.to_string(),
        name,
    }
}

fn out_of_range(path: &str, name: &'static str, value: f64) -> SchemaError {
    SchemaError::OutOfRange {
        path: path.to_string(),
        name,
        value,
    }
}

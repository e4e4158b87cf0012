use std::{fs::File, io::BufReader, path::Path};

use chainring::{avec::FromElement, value::ValueError};
use csv::ReaderBuilder;

#[test]
fn decode_slice_running() {
    const PATH: &str = "fixtures/morning-run.tcx";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    chainring::avec::decode_slice(&data, &mut validator).unwrap();
    validator.finish();
}

#[test]
fn decode_reader_running() {
    const PATH: &str = "fixtures/morning-run.tcx";
    let mut file = BufReader::new(File::open(PATH).unwrap());
    let mut validator = Validator::new(PATH);
    chainring::avec::decode_reader(&mut file, &mut validator).unwrap();
    validator.finish();
}

/// Elements received as nested receivers. All others are leaves.
const CONTAINERS: &[&str] = &[
    "TrainingCenterDatabase",
    "Activities",
    "Activity",
    "Lap",
    "AverageHeartRateBpm",
    "MaximumHeartRateBpm",
    "Track",
    "Trackpoint",
    "Position",
    "HeartRateBpm",
    "Extensions",
    "TPX",
    "Creator",
    "Version",
    "Author",
];

/// Checks published content against the expected events, in order.
struct Validator(Vec<Vec<String>>);

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("events.csv");

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let mut expected: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        expected.reverse();

        Self(expected)
    }

    fn expect(&mut self, kind: &str, name: &str, text: &str) {
        let row = self.0.pop().expect("more events than expected");
        assert_eq!(row, [kind, name, text]);
    }

    fn finish(&self) {
        assert!(self.0.is_empty(), "{} events not received", self.0.len());
    }
}

impl FromElement for Validator {
    fn add_element(&mut self, name: &str) -> Option<&mut dyn FromElement> {
        if !CONTAINERS.contains(&name) {
            return None;
        }

        self.expect("element", name, "");
        Some(self)
    }

    fn add_value(&mut self, name: &str, text: &str) -> Result<(), ValueError> {
        self.expect("value", name, text);
        Ok(())
    }

    fn add_attribute(&mut self, name: &str, text: &str) -> Result<(), ValueError> {
        self.expect("attribute", name, text);
        Ok(())
    }
}

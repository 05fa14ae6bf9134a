//! Reads a benchmark's settings file: a two-column CSV of `key,value` pairs describing which
//! metric and tactic to run a benchmark's example/grammar pair through, plus the expected
//! stdout for each example file the benchmark bundles.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{SynthError, SynthResult};

/// One benchmark's configuration, as read from its settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkSettings {
    pub description: String,
    pub metric: String,
    pub metric_parameter: String,
    pub tactic: String,
    pub tactic_parameter: String,
    pub max_height: u32,
    /// Example-file stem -> expected stdout, for every key that isn't one of the fixed fields
    /// above.
    pub expected_outputs: BTreeMap<String, String>,
}

const FIXED_KEYS: &[&str] =
    &["description", "metric", "metric-parameter", "tactic", "tactic-parameter", "max-height"];

pub fn read_settings(path: impl AsRef<Path>) -> SynthResult<BenchmarkSettings> {
    let mut reader = ::csv::ReaderBuilder::new().has_headers(false).flexible(true).from_path(path)?;
    let mut settings = BenchmarkSettings::default();
    let mut max_height_seen = false;
    for record in reader.records() {
        let record = record?;
        if record.len() < 2 {
            return Err(SynthError::InputParse("settings row must have a key and a value".to_owned()));
        }
        let key = record[0].trim();
        let value = record[1].trim().to_owned();
        match key {
            "description" => settings.description = value,
            "metric" => settings.metric = value,
            "metric-parameter" => settings.metric_parameter = value,
            "tactic" => settings.tactic = value,
            "tactic-parameter" => settings.tactic_parameter = value,
            "max-height" => {
                settings.max_height = value
                    .parse()
                    .map_err(|_| SynthError::InputParse(format!("max-height '{value}' is not an integer")))?;
                max_height_seen = true;
            }
            stem if !FIXED_KEYS.contains(&stem) => {
                settings.expected_outputs.insert(stem.to_owned(), value);
            }
            _ => {}
        }
    }
    if !max_height_seen {
        return Err(SynthError::InputParse("settings file is missing 'max-height'".to_owned()));
    }
    Ok(settings)
}

//! Volume geometry carried in the first slice's ImageDescription
//!
//! The description is a block of `key=value` lines:
//!
//! ```text
//! volcrop=0.1.0
//! slices=24
//! spacing=0.5 0.5 2
//! origin=-12 4.25 0
//! direction=1 0 0 0 1 0 0 0 1
//! ```
//!
//! `direction` is row-major. Unknown keys are ignored, so descriptions
//! written by other tools (ImageJ writes `spacing=<z>`) still load.

use std::collections::HashMap;

use log::{debug, warn};

use crate::utils::string_utils::join_values;
use crate::volume::{Direction, Volume};

const GENERATOR_KEY: &str = "volcrop";
const SLICES_KEY: &str = "slices";
const SPACING_KEY: &str = "spacing";
const ORIGIN_KEY: &str = "origin";
const DIRECTION_KEY: &str = "direction";

/// Geometry recovered from a description block
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeDescription {
    /// Version of the tool that wrote the description, when it was us
    pub generator: Option<String>,
    pub slices: Option<usize>,
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
    pub direction: Direction,
}

impl Default for VolumeDescription {
    fn default() -> Self {
        VolumeDescription {
            generator: None,
            slices: None,
            spacing: [1.0; 3],
            origin: [0.0; 3],
            direction: Direction::identity(),
        }
    }
}

impl VolumeDescription {
    /// Description for a volume about to be written
    pub fn for_volume(volume: &Volume) -> Self {
        VolumeDescription {
            generator: Some(env!("CARGO_PKG_VERSION").to_string()),
            slices: Some(volume.dimensions()[2]),
            spacing: volume.spacing(),
            origin: volume.origin(),
            direction: *volume.direction(),
        }
    }

    /// Parses a description; malformed values fall back to the defaults
    pub fn parse(text: &str) -> Self {
        let fields: HashMap<&str, &str> = text
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();

        let mut description = VolumeDescription {
            generator: fields.get(GENERATOR_KEY).map(|v| v.to_string()),
            slices: fields.get(SLICES_KEY).and_then(|v| v.parse().ok()),
            ..VolumeDescription::default()
        };

        if let Some(values) = fields.get(SPACING_KEY).and_then(|v| parse_floats(v, SPACING_KEY)) {
            match values.len() {
                1 => description.spacing[2] = values[0],
                3 => description.spacing.copy_from_slice(&values),
                n => warn!("Ignoring spacing with {} values", n),
            }
        }

        if let Some(values) = fields.get(ORIGIN_KEY).and_then(|v| parse_floats(v, ORIGIN_KEY)) {
            match values.len() {
                3 => description.origin.copy_from_slice(&values),
                n => warn!("Ignoring origin with {} values", n),
            }
        }

        if let Some(values) = fields.get(DIRECTION_KEY).and_then(|v| parse_floats(v, DIRECTION_KEY)) {
            match <[f64; 9]>::try_from(values.as_slice()) {
                Ok(matrix) => description.direction = Direction::from_row_major(&matrix),
                Err(_) => warn!("Ignoring direction with {} values", values.len()),
            }
        }

        debug!("Parsed volume description: {:?}", description);
        description
    }

    /// Renders the description block
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if let Some(generator) = &self.generator {
            lines.push(format!("{}={}", GENERATOR_KEY, generator));
        }
        if let Some(slices) = self.slices {
            lines.push(format!("{}={}", SLICES_KEY, slices));
        }
        lines.push(format!("{}={}", SPACING_KEY, join_values(&self.spacing)));
        lines.push(format!("{}={}", ORIGIN_KEY, join_values(&self.origin)));
        lines.push(format!("{}={}", DIRECTION_KEY, join_values(&self.direction.to_row_major())));
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

fn parse_floats(value: &str, key: &str) -> Option<Vec<f64>> {
    let parsed = value
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>();
    match parsed {
        Ok(values) if values.iter().all(|v| v.is_finite()) => Some(values),
        _ => {
            warn!("Ignoring malformed {} value '{}'", key, value);
            None
        }
    }
}

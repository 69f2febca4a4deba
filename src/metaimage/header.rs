//! MetaImage header model, parser and renderer
//!
//! A MetaImage header is a list of `Key = Value` text lines. The
//! `ElementDataFile` key is always last; for `LOCAL` data the voxel payload
//! starts right after its line.

use std::collections::HashMap;
use std::io::BufRead;

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::Regex;

use crate::io::byte_order::ByteOrder;
use crate::io::samples::ElementKind;
use crate::volume::errors::{VolumeError, VolumeResult};
use crate::volume::{Direction, Volume};

use super::keys;

lazy_static! {
    static ref HEADER_LINE: Regex =
        Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$").expect("header line pattern");
}

/// Upper bound on header lines before the payload must have been announced
const MAX_HEADER_LINES: usize = 256;

/// Where the voxel payload lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataFile {
    /// Immediately after the header
    Local,
    /// In a separate file, relative to the header's directory
    External(String),
}

/// Parsed MetaImage header, padded to three axes
#[derive(Debug, Clone, PartialEq)]
pub struct MetaHeader {
    pub dimensions: [usize; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
    pub direction: Direction,
    pub element_kind: ElementKind,
    pub byte_order: ByteOrder,
    pub compressed: bool,
    pub compressed_size: Option<usize>,
    /// Bytes to skip in an external data file; -1 means "payload is at the end"
    pub header_size: Option<i64>,
    pub data_file: DataFile,
}

impl MetaHeader {
    /// Header describing `volume` stored as little-endian MET_FLOAT
    pub fn for_volume(volume: &Volume, compressed: bool, data_file: DataFile) -> Self {
        MetaHeader {
            dimensions: volume.dimensions(),
            spacing: volume.spacing(),
            origin: volume.origin(),
            direction: *volume.direction(),
            element_kind: ElementKind::F32,
            byte_order: ByteOrder::LittleEndian,
            compressed,
            compressed_size: None,
            header_size: None,
            data_file,
        }
    }

    /// Number of voxels described by the header
    ///
    /// A `DimSize` product that does not fit in `usize` is an invalid header.
    pub fn voxel_count(&self) -> VolumeResult<usize> {
        self.dimensions
            .iter()
            .try_fold(1usize, |acc, d| acc.checked_mul(*d))
            .ok_or_else(|| {
                VolumeError::InvalidHeader(format!("{} {:?} overflows", keys::DIM_SIZE, self.dimensions))
            })
    }

    /// Reads header lines up to and including `ElementDataFile`
    ///
    /// The reader is left positioned at the first payload byte.
    pub fn parse<R: BufRead>(reader: &mut R) -> VolumeResult<Self> {
        let mut fields: HashMap<String, String> = HashMap::new();
        let mut line = Vec::new();

        for line_number in 1..=MAX_HEADER_LINES {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }

            let text = std::str::from_utf8(&line).map_err(|_| {
                VolumeError::InvalidHeader(format!("Line {} is not text", line_number))
            })?;
            if text.trim().is_empty() {
                continue;
            }

            let captures = HEADER_LINE.captures(text).ok_or_else(|| {
                VolumeError::InvalidHeader(format!("Malformed line {}: '{}'", line_number, text.trim()))
            })?;
            let key = captures[1].to_string();
            let value = captures[2].to_string();
            trace!("Header field {} = {}", key, value);

            if key == keys::ELEMENT_DATA_FILE {
                fields.insert(key, value);
                return Self::from_fields(&fields);
            }
            fields.insert(key, value);
        }

        Err(VolumeError::InvalidHeader(format!(
            "{} not found in header",
            keys::ELEMENT_DATA_FILE
        )))
    }

    fn from_fields(fields: &HashMap<String, String>) -> VolumeResult<Self> {
        if let Some(object_type) = lookup(fields, &[keys::OBJECT_TYPE]) {
            if !object_type.eq_ignore_ascii_case("image") {
                return Err(VolumeError::UnsupportedFormat(format!(
                    "MetaImage object type '{}'",
                    object_type
                )));
            }
        }

        let ndims: usize = parse_scalar(required(fields, &[keys::NDIMS])?, keys::NDIMS)?;
        if !(1..=3).contains(&ndims) {
            return Err(VolumeError::UnsupportedFormat(format!(
                "{}-dimensional MetaImage, expected at most 3 axes",
                ndims
            )));
        }

        let dim_values: Vec<usize> = parse_list(required(fields, &[keys::DIM_SIZE])?, keys::DIM_SIZE, ndims)?;
        let mut dimensions = [1usize; 3];
        dimensions[..ndims].copy_from_slice(&dim_values);

        let mut spacing = [1.0f64; 3];
        if let Some(value) = lookup(fields, &[keys::ELEMENT_SPACING, keys::ELEMENT_SIZE]) {
            let values: Vec<f64> = parse_list(value, keys::ELEMENT_SPACING, ndims)?;
            spacing[..ndims].copy_from_slice(&values);
        }

        let mut origin = [0.0f64; 3];
        if let Some(value) = lookup(fields, &[keys::OFFSET, keys::ORIGIN, keys::POSITION]) {
            let values: Vec<f64> = parse_list(value, keys::OFFSET, ndims)?;
            origin[..ndims].copy_from_slice(&values);
        }

        let mut direction = Direction::identity();
        if let Some(value) = lookup(fields, &[keys::TRANSFORM_MATRIX, keys::ROTATION, keys::ORIENTATION]) {
            let values: Vec<f64> = parse_list(value, keys::TRANSFORM_MATRIX, ndims * ndims)?;
            // row `axis` of TransformMatrix is the physical direction of that axis
            for axis in 0..ndims {
                for component in 0..ndims {
                    direction.0[(component, axis)] = values[axis * ndims + component];
                }
            }
        }

        let channels: usize = match lookup(fields, &[keys::ELEMENT_NUMBER_OF_CHANNELS]) {
            Some(value) => parse_scalar(value, keys::ELEMENT_NUMBER_OF_CHANNELS)?,
            None => 1,
        };
        if channels != 1 {
            return Err(VolumeError::UnsupportedSampleType(format!(
                "{} channels per voxel, only scalar volumes are supported",
                channels
            )));
        }

        let element_kind = element_kind_from_name(required(fields, &[keys::ELEMENT_TYPE])?)?;

        let msb = match lookup(fields, &[keys::BINARY_DATA_BYTE_ORDER_MSB, keys::ELEMENT_BYTE_ORDER_MSB]) {
            Some(value) => parse_bool(value, keys::BINARY_DATA_BYTE_ORDER_MSB)?,
            None => false,
        };

        if let Some(value) = lookup(fields, &[keys::BINARY_DATA]) {
            if !parse_bool(value, keys::BINARY_DATA)? {
                return Err(VolumeError::UnsupportedFormat("ASCII MetaImage payload".to_string()));
            }
        }

        let compressed = match lookup(fields, &[keys::COMPRESSED_DATA]) {
            Some(value) => parse_bool(value, keys::COMPRESSED_DATA)?,
            None => false,
        };
        let compressed_size = lookup(fields, &[keys::COMPRESSED_DATA_SIZE])
            .map(|v| parse_scalar::<usize>(v, keys::COMPRESSED_DATA_SIZE))
            .transpose()?;
        let header_size = lookup(fields, &[keys::HEADER_SIZE])
            .map(|v| parse_scalar::<i64>(v, keys::HEADER_SIZE))
            .transpose()?;

        let data_file_value = required(fields, &[keys::ELEMENT_DATA_FILE])?;
        let data_file = if data_file_value.eq_ignore_ascii_case("LOCAL") {
            DataFile::Local
        } else if data_file_value.starts_with("LIST") || data_file_value.contains('%') {
            return Err(VolumeError::UnsupportedFormat(format!(
                "multi-file MetaImage payload '{}'",
                data_file_value
            )));
        } else {
            DataFile::External(data_file_value.to_string())
        };

        if ndims < 3 {
            warn!("{}-dimensional MetaImage padded to three axes", ndims);
        }
        debug!(
            "MetaImage header: {:?} {:?}, compressed={}, data={:?}",
            dimensions, element_kind, compressed, data_file
        );

        Ok(MetaHeader {
            dimensions,
            spacing,
            origin,
            direction,
            element_kind,
            byte_order: ByteOrder::from_msb_flag(msb),
            compressed,
            compressed_size,
            header_size,
            data_file,
        })
    }

    /// Renders the header text, ending with the `ElementDataFile` line
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("{} = Image", keys::OBJECT_TYPE),
            format!("{} = 3", keys::NDIMS),
            format!("{} = True", keys::BINARY_DATA),
            format!(
                "{} = {}",
                keys::BINARY_DATA_BYTE_ORDER_MSB,
                render_bool(self.byte_order == ByteOrder::BigEndian)
            ),
            format!("{} = {}", keys::COMPRESSED_DATA, render_bool(self.compressed)),
        ];
        if let Some(size) = self.compressed_size {
            lines.push(format!("{} = {}", keys::COMPRESSED_DATA_SIZE, size));
        }
        lines.push(format!(
            "{} = {}",
            keys::TRANSFORM_MATRIX,
            join(&self.direction.to_column_major())
        ));
        lines.push(format!("{} = {}", keys::OFFSET, join(&self.origin)));
        lines.push(format!("{} = 0 0 0", keys::CENTER_OF_ROTATION));
        lines.push(format!("{} = {}", keys::ELEMENT_SPACING, join(&self.spacing)));
        lines.push(format!("{} = {}", keys::DIM_SIZE, join(&self.dimensions)));
        lines.push(format!("{} = {}", keys::ELEMENT_TYPE, element_kind_name(self.element_kind)));
        let data_file = match &self.data_file {
            DataFile::Local => "LOCAL".to_string(),
            DataFile::External(name) => name.clone(),
        };
        lines.push(format!("{} = {}", keys::ELEMENT_DATA_FILE, data_file));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

/// First value present under any of `names`
fn lookup<'a>(fields: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| fields.get(*name).map(String::as_str))
}

fn required<'a>(fields: &'a HashMap<String, String>, names: &[&str]) -> VolumeResult<&'a str> {
    lookup(fields, names).ok_or_else(|| VolumeError::InvalidHeader(format!("Missing {}", names[0])))
}

fn parse_scalar<T: std::str::FromStr>(value: &str, key: &str) -> VolumeResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| VolumeError::InvalidHeader(format!("Invalid {} value '{}'", key, value)))
}

fn parse_list<T: std::str::FromStr>(value: &str, key: &str, expected: usize) -> VolumeResult<Vec<T>> {
    let values = value
        .split_whitespace()
        .map(|v| parse_scalar::<T>(v, key))
        .collect::<VolumeResult<Vec<T>>>()?;
    if values.len() != expected {
        return Err(VolumeError::InvalidHeader(format!(
            "{} has {} values, expected {}",
            key,
            values.len(),
            expected
        )));
    }
    Ok(values)
}

fn parse_bool(value: &str, key: &str) -> VolumeResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(VolumeError::InvalidHeader(format!("Invalid {} value '{}'", key, value))),
    }
}

fn render_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Maps a MetaImage element type name to an element kind
pub fn element_kind_from_name(name: &str) -> VolumeResult<ElementKind> {
    match name.trim() {
        "MET_CHAR" => Ok(ElementKind::I8),
        "MET_UCHAR" => Ok(ElementKind::U8),
        "MET_SHORT" => Ok(ElementKind::I16),
        "MET_USHORT" => Ok(ElementKind::U16),
        "MET_INT" | "MET_LONG" => Ok(ElementKind::I32),
        "MET_UINT" | "MET_ULONG" => Ok(ElementKind::U32),
        "MET_FLOAT" => Ok(ElementKind::F32),
        "MET_DOUBLE" => Ok(ElementKind::F64),
        other => Err(VolumeError::UnsupportedSampleType(other.to_string())),
    }
}

/// MetaImage element type name for an element kind
pub fn element_kind_name(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::I8 => "MET_CHAR",
        ElementKind::U8 => "MET_UCHAR",
        ElementKind::I16 => "MET_SHORT",
        ElementKind::U16 => "MET_USHORT",
        ElementKind::I32 => "MET_INT",
        ElementKind::U32 => "MET_UINT",
        ElementKind::F32 => "MET_FLOAT",
        ElementKind::F64 => "MET_DOUBLE",
    }
}

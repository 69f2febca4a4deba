//! Conversion between stored element types and the pipeline sample type

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::io::byte_order::ByteOrder;
use crate::volume::errors::{VolumeError, VolumeResult};
use crate::volume::Sample;

/// Element types a volume file may store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ElementKind {
    /// Size of one element in bytes
    pub fn byte_size(&self) -> usize {
        match self {
            ElementKind::I8 | ElementKind::U8 => 1,
            ElementKind::I16 | ElementKind::U16 => 2,
            ElementKind::I32 | ElementKind::U32 | ElementKind::F32 => 4,
            ElementKind::F64 => 8,
        }
    }
}

/// Decodes `count` elements from `bytes` into samples
///
/// Integer and double values are converted with `as`, the same cast the
/// pipeline applies everywhere else.
pub fn decode_samples(
    bytes: &[u8],
    kind: ElementKind,
    order: ByteOrder,
    count: usize,
) -> VolumeResult<Vec<Sample>> {
    let needed = count.checked_mul(kind.byte_size()).ok_or_else(|| {
        VolumeError::InvalidHeader(format!("Element count {} overflows the payload size", count))
    })?;
    if bytes.len() < needed {
        return Err(VolumeError::InvalidHeader(format!(
            "Voxel payload holds {} bytes, {} {:?} elements need {}",
            bytes.len(),
            count,
            kind,
            needed
        )));
    }
    debug!("Decoding {} {:?} elements ({})", count, kind, order.name());

    let handler = order.create_handler();
    let mut cursor = Cursor::new(&bytes[..needed]);
    let mut samples = Vec::with_capacity(count);
    for _ in 0..count {
        let value = match kind {
            ElementKind::I8 => cursor.read_i8()? as Sample,
            ElementKind::U8 => cursor.read_u8()? as Sample,
            ElementKind::I16 => handler.read_i16(&mut cursor)? as Sample,
            ElementKind::U16 => handler.read_u16(&mut cursor)? as Sample,
            ElementKind::I32 => handler.read_i32(&mut cursor)? as Sample,
            ElementKind::U32 => handler.read_u32(&mut cursor)? as Sample,
            ElementKind::F32 => handler.read_f32(&mut cursor)?,
            ElementKind::F64 => handler.read_f64(&mut cursor)? as Sample,
        };
        samples.push(value);
    }

    Ok(samples)
}

/// Encodes samples as little-endian IEEE floats
pub fn encode_samples_le(samples: &[Sample]) -> VolumeResult<Vec<u8>> {
    let mut bytes = Vec::with_capacity(samples.len() * std::mem::size_of::<Sample>());
    for value in samples {
        bytes.write_f32::<LittleEndian>(*value)?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::BigEndian;

    #[test]
    fn decodes_big_endian_shorts() {
        let mut bytes = Vec::new();
        bytes.write_i16::<BigEndian>(-300).unwrap();
        bytes.write_i16::<BigEndian>(1200).unwrap();
        let samples = decode_samples(&bytes, ElementKind::I16, ByteOrder::BigEndian, 2).unwrap();
        assert_eq!(samples, vec![-300.0, 1200.0]);
    }

    #[test]
    fn floats_survive_encoding() {
        let values = vec![0.0, -1.5, 3.25e7, f32::MIN_POSITIVE];
        let bytes = encode_samples_le(&values).unwrap();
        let decoded = decode_samples(&bytes, ElementKind::F32, ByteOrder::LittleEndian, 4).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn short_payload_is_rejected() {
        let err = decode_samples(&[0u8; 7], ElementKind::F64, ByteOrder::LittleEndian, 1).unwrap_err();
        assert!(matches!(err, VolumeError::InvalidHeader(_)));
    }
}

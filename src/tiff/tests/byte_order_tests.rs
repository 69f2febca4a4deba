//! Tests for the byte order handlers

use std::io::Cursor;
use byteorder::{LittleEndian, BigEndian, WriteBytesExt};
use crate::io::byte_order::{ByteOrder, ByteOrderHandler, LittleEndianHandler, BigEndianHandler};
use crate::volume::errors::VolumeError;

#[test]
fn test_byte_order_detection() {
    let mut cursor = Cursor::new(b"II".to_vec());
    assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::LittleEndian);

    let mut cursor = Cursor::new(b"MM".to_vec());
    assert_eq!(ByteOrder::detect(&mut cursor).unwrap(), ByteOrder::BigEndian);
}

#[test]
fn test_byte_order_detection_invalid() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    let mut cursor = Cursor::new(buffer);

    assert!(matches!(ByteOrder::detect(&mut cursor), Err(VolumeError::InvalidHeader(_))));
}

#[test]
fn test_msb_flag() {
    assert_eq!(ByteOrder::from_msb_flag(true), ByteOrder::BigEndian);
    assert_eq!(ByteOrder::from_msb_flag(false), ByteOrder::LittleEndian);
}

#[test]
fn test_little_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x1234).unwrap();
    buffer.write_i32::<LittleEndian>(-70000).unwrap();
    buffer.write_u64::<LittleEndian>(0x1234567890ABCDEF).unwrap();
    buffer.write_f64::<LittleEndian>(-2.5).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = LittleEndianHandler;

    assert_eq!(handler.read_u16(&mut cursor).unwrap(), 0x1234);
    assert_eq!(handler.read_i32(&mut cursor).unwrap(), -70000);
    assert_eq!(handler.read_u64(&mut cursor).unwrap(), 0x1234567890ABCDEF);
    assert_eq!(handler.read_f64(&mut cursor).unwrap(), -2.5);
}

#[test]
fn test_big_endian_handler() {
    let mut buffer = Vec::new();
    buffer.write_i16::<BigEndian>(-2).unwrap();
    buffer.write_u32::<BigEndian>(0x12345678).unwrap();
    buffer.write_f32::<BigEndian>(0.75).unwrap();
    let mut cursor = Cursor::new(buffer);

    let handler = BigEndianHandler;

    assert_eq!(handler.read_i16(&mut cursor).unwrap(), -2);
    assert_eq!(handler.read_u32(&mut cursor).unwrap(), 0x12345678);
    assert_eq!(handler.read_f32(&mut cursor).unwrap(), 0.75);
}

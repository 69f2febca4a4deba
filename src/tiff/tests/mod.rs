//! Tests for the TIFF volume module

mod byte_order_tests;
mod reader_tests;
mod stack_tests;

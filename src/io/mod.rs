//! I/O utilities for volume files
//!
//! This module provides byte-order handling, the seekable reader trait,
//! and the format strategies that load and store volumes.

pub mod seekable;
pub mod byte_order;
pub mod samples;
pub mod format_strategy;

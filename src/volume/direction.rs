//! Orientation matrix mapping index axes to physical space

use std::fmt;

use nalgebra::{Matrix3, Vector3};

/// 3×3 direction matrix
///
/// Column `a` is the physical-space direction of index axis `a`, so a
/// physical offset is `direction · (spacing ⊙ index)`. This is a thin
/// wrapper around nalgebra's `Matrix3`; the inner matrix stays public for
/// anything the wrapper does not cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction(pub Matrix3<f64>);

impl Direction {
    /// The identity orientation
    pub fn identity() -> Self {
        Direction(Matrix3::identity())
    }

    /// Build from nine values listed row by row
    pub fn from_row_major(values: &[f64; 9]) -> Self {
        Direction(Matrix3::from_row_slice(values))
    }

    /// Build from nine values listed column by column (one axis vector after another)
    pub fn from_column_major(values: &[f64; 9]) -> Self {
        Direction(Matrix3::from_column_slice(values))
    }

    /// Flatten row by row
    pub fn to_row_major(&self) -> [f64; 9] {
        let mut out = [0.0; 9];
        out.copy_from_slice(self.0.transpose().as_slice());
        out
    }

    /// Flatten column by column
    pub fn to_column_major(&self) -> [f64; 9] {
        let mut out = [0.0; 9];
        out.copy_from_slice(self.0.as_slice());
        out
    }

    /// Matrix-vector product
    pub fn apply(&self, v: Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }

    pub fn is_identity(&self) -> bool {
        self.0 == Matrix3::identity()
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::identity()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self
            .0
            .row_iter()
            .map(|r| format!("[{} {} {}]", r[0], r[1], r[2]))
            .collect();
        write!(f, "{}", rows.join(" "))
    }
}

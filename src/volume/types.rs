//! Core volume data structure

use std::fmt;

use nalgebra::Vector3;

use super::direction::Direction;
use super::errors::{VolumeError, VolumeResult};

/// Voxel sample type used throughout the pipeline
pub type Sample = f32;

/// A 3D scalar image with its physical geometry
///
/// Voxels are stored with x varying fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Voxel counts per axis
    dimensions: [usize; 3],
    /// Physical distance between voxel centers per axis
    spacing: [f64; 3],
    /// Physical coordinate of voxel (0,0,0)
    origin: [f64; 3],
    /// Index-to-physical axis orientation
    direction: Direction,
    /// Voxel buffer
    data: Vec<Sample>,
}

impl Volume {
    /// Creates a volume with unit spacing, zero origin and identity direction
    ///
    /// Fails when the buffer length does not match the dimensions.
    pub fn new(dimensions: [usize; 3], data: Vec<Sample>) -> VolumeResult<Self> {
        let expected = voxel_count(dimensions)?;
        if data.len() != expected {
            return Err(VolumeError::GenericError(format!(
                "Voxel buffer holds {} samples, dimensions {}x{}x{} require {}",
                data.len(),
                dimensions[0],
                dimensions[1],
                dimensions[2],
                expected
            )));
        }

        Ok(Volume {
            dimensions,
            spacing: [1.0; 3],
            origin: [0.0; 3],
            direction: Direction::identity(),
            data,
        })
    }

    /// Creates a volume whose voxels are produced by `f(x, y, z)`
    pub fn from_fn<F>(dimensions: [usize; 3], mut f: F) -> VolumeResult<Self>
    where
        F: FnMut(usize, usize, usize) -> Sample,
    {
        let mut data = Vec::with_capacity(voxel_count(dimensions)?);
        for z in 0..dimensions[2] {
            for y in 0..dimensions[1] {
                for x in 0..dimensions[0] {
                    data.push(f(x, y, z));
                }
            }
        }
        Volume::new(dimensions, data)
    }

    /// Replaces the spacing; every component must be finite and positive
    pub fn with_spacing(mut self, spacing: [f64; 3]) -> VolumeResult<Self> {
        if let Some(axis) = spacing.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(VolumeError::InvalidHeader(format!(
                "Spacing must be positive, axis {} has {}",
                axis, spacing[axis]
            )));
        }
        self.spacing = spacing;
        Ok(self)
    }

    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    pub fn origin(&self) -> [f64; 3] {
        self.origin
    }

    pub fn direction(&self) -> &Direction {
        &self.direction
    }

    pub fn data(&self) -> &[Sample] {
        &self.data
    }

    /// Mutable access to the voxel buffer (its length cannot change)
    pub fn data_mut(&mut self) -> &mut [Sample] {
        &mut self.data
    }

    /// Total number of voxels
    pub fn voxel_count(&self) -> usize {
        self.data.len()
    }

    /// Whether any axis has zero extent
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Linear buffer position of voxel (x, y, z), if inside the volume
    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let [nx, ny, nz] = self.dimensions;
        if x >= nx || y >= ny || z >= nz {
            return None;
        }
        Some((z * ny + y) * nx + x)
    }

    /// Voxel value at (x, y, z)
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> Option<Sample> {
        self.linear_index(x, y, z).map(|i| self.data[i])
    }

    /// Number of voxels in one z-slice
    pub fn slice_len(&self) -> usize {
        self.dimensions[0] * self.dimensions[1]
    }

    /// Voxels of z-slice `z`
    pub fn slice(&self, z: usize) -> Option<&[Sample]> {
        if z >= self.dimensions[2] {
            return None;
        }
        let len = self.slice_len();
        Some(&self.data[z * len..(z + 1) * len])
    }

    /// Physical coordinate of a (possibly fractional) index
    ///
    /// `origin + direction · (spacing ⊙ index)`
    pub fn index_to_physical(&self, index: [f64; 3]) -> [f64; 3] {
        let scaled = Vector3::from(index).component_mul(&Vector3::from(self.spacing));
        let physical = Vector3::from(self.origin) + self.direction.apply(scaled);
        physical.into()
    }
}

/// Product of the dimensions, failing on overflow
fn voxel_count(dimensions: [usize; 3]) -> VolumeResult<usize> {
    dimensions
        .iter()
        .try_fold(1usize, |acc, d| acc.checked_mul(*d))
        .ok_or_else(|| {
            VolumeError::GenericError(format!(
                "Dimensions {}x{}x{} overflow the addressable voxel count",
                dimensions[0], dimensions[1], dimensions[2]
            ))
        })
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Volume:")?;
        writeln!(
            f,
            "  Dimensions: {}x{}x{}",
            self.dimensions[0], self.dimensions[1], self.dimensions[2]
        )?;
        writeln!(
            f,
            "  Spacing: {} {} {}",
            self.spacing[0], self.spacing[1], self.spacing[2]
        )?;
        writeln!(
            f,
            "  Origin: {} {} {}",
            self.origin[0], self.origin[1], self.origin[2]
        )?;
        writeln!(f, "  Direction: {}", self.direction)?;
        write!(f, "  Voxels: {}", self.data.len())
    }
}

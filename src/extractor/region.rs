//! Region structure for defining the extraction box
//!
//! A region is an axis-aligned box in a volume's index space, given by its
//! starting voxel (inclusive) and its extent along each axis.

use std::fmt;

use crate::volume::errors::{VolumeError, VolumeResult};

/// Region for volume extraction (in voxel coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Starting voxel on each axis (inclusive)
    pub index: [usize; 3],

    /// Voxel extent on each axis
    pub size: [usize; 3],
}

impl Region {
    /// Create a new region
    ///
    /// # Arguments
    /// * `index` - Starting voxel per axis
    /// * `size` - Extent per axis
    pub fn new(index: [usize; 3], size: [usize; 3]) -> Self {
        Region { index, size }
    }

    /// Region covering a whole volume of the given dimensions
    pub fn full(dimensions: [usize; 3]) -> Self {
        Region { index: [0; 3], size: dimensions }
    }

    /// One past the last voxel on `axis`, or None if it overflows
    pub fn end(&self, axis: usize) -> Option<usize> {
        self.index[axis].checked_add(self.size[axis])
    }

    /// Number of voxels covered by the region
    pub fn voxel_count(&self) -> usize {
        self.size.iter().product()
    }

    /// Checks the region against volume dimensions
    ///
    /// Returns the first offending axis as `RegionOutOfBounds`.
    pub fn validate(&self, dimensions: [usize; 3]) -> VolumeResult<()> {
        for axis in 0..3 {
            let fits = self.end(axis).is_some_and(|end| end <= dimensions[axis]);
            if !fits {
                return Err(VolumeError::RegionOutOfBounds {
                    axis,
                    index: self.index[axis],
                    size: self.size[axis],
                    dimension: dimensions[axis],
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index=({}, {}, {}) size=({}, {}, {})",
            self.index[0], self.index[1], self.index[2], self.size[0], self.size[1], self.size[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_reports_first_offending_axis() {
        let region = Region::new([8, 0, 9], [4, 4, 4]);
        match region.validate([10, 10, 10]) {
            Err(VolumeError::RegionOutOfBounds { axis, index, size, dimension }) => {
                assert_eq!((axis, index, size, dimension), (0, 8, 4, 10));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn region_touching_the_edge_is_valid() {
        assert!(Region::new([6, 6, 6], [4, 4, 4]).validate([10, 10, 10]).is_ok());
        assert!(Region::new([10, 0, 0], [0, 1, 1]).validate([10, 10, 10]).is_ok());
    }

    #[test]
    fn overflowing_end_is_out_of_bounds() {
        let region = Region::new([usize::MAX, 0, 0], [2, 1, 1]);
        assert!(region.end(0).is_none());
        assert!(region.validate([10, 10, 10]).is_err());
    }
}

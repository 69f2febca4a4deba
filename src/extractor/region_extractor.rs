//! Sub-volume extraction
//!
//! Copies the voxels inside a validated region into a new, independent
//! volume and derives the cropped geometry.

use log::{debug, info};

use crate::volume::errors::VolumeResult;
use crate::volume::{Sample, Volume};

use super::region::Region;

/// Extracts `region` from `volume`
///
/// The region is validated against the volume before any voxel is copied.
/// The result has `dimensions = region.size`, the source spacing and
/// direction, and an origin at the physical position of `region.index`.
pub fn extract(volume: &Volume, region: &Region) -> VolumeResult<Volume> {
    let dims = volume.dimensions();
    region.validate(dims)?;

    info!("Extracting {} from volume {}x{}x{}", region, dims[0], dims[1], dims[2]);

    let [ix, iy, iz] = region.index;
    let [sx, sy, sz] = region.size;
    let (nx, ny) = (dims[0], dims[1]);
    let source = volume.data();

    let mut data: Vec<Sample> = Vec::with_capacity(region.voxel_count());
    if sx > 0 {
        for z in iz..iz + sz {
            for y in iy..iy + sy {
                let start = (z * ny + y) * nx + ix;
                data.extend_from_slice(&source[start..start + sx]);
            }
        }
    }
    debug!("Copied {} voxels", data.len());

    let index = [ix as f64, iy as f64, iz as f64];
    let origin = volume.index_to_physical(index);
    debug!("Cropped origin: {:?}", origin);

    let cropped = Volume::new(region.size, data)?
        .with_spacing(volume.spacing())?
        .with_origin(origin)
        .with_direction(*volume.direction());

    Ok(cropped)
}

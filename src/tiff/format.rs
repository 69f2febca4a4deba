//! Multi-page TIFF volume format strategy
//!
//! A volume is a stack of pages, one per z-slice. Page 0 carries the
//! geometry in its ImageDescription.

use log::{debug, info, warn};

use crate::io::format_strategy::{VolumeFormat, WriteOptions};
use crate::io::samples::encode_samples_le;
use crate::tiff::builder::TiffBuilder;
use crate::tiff::constants::{header, tags};
use crate::tiff::description::VolumeDescription;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::tiff::slice_reader::{SliceLayout, SliceReader};
use crate::utils::progress::ProgressTracker;
use crate::volume::errors::{VolumeError, VolumeResult};
use crate::volume::Volume;

/// `.tif` / `.tiff` volume stacks
pub struct TiffVolumeFormat;

impl TiffVolumeFormat {
    pub fn new() -> Self {
        TiffVolumeFormat
    }

    fn read_stack(&self, path: &str) -> VolumeResult<Volume> {
        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.load(path)?;
        debug!("{}", tiff);

        let slices: Vec<&IFD> = tiff.slices();
        let skipped = tiff.ifd_count() - slices.len();
        if skipped > 0 {
            info!("Skipping {} reduced-resolution IFDs", skipped);
        }
        let first = *slices
            .first()
            .ok_or_else(|| VolumeError::InvalidHeader("TIFF has no full-resolution image".to_string()))?;

        let mut reader = tiff_reader.create_reader()?;
        let description = tiff_reader
            .read_ascii_tag(&mut reader, first, tags::IMAGE_DESCRIPTION)?
            .map(|text| VolumeDescription::parse(&text))
            .unwrap_or_default();

        if let Some(expected) = description.slices {
            if expected != slices.len() {
                let message = format!("Description announces {} slices, file holds {}", expected, slices.len());
                if description.generator.is_some() {
                    return Err(VolumeError::InvalidHeader(message));
                }
                warn!("{}", message);
            }
        }

        let first_layout = SliceLayout::from_ifd(first)?;
        let slice_reader = SliceReader::new(&tiff_reader, &mut reader)?;
        let mut data = Vec::with_capacity(first_layout.pixel_count() * slices.len());

        let progress = ProgressTracker::new(slices.len() as u64, "Decoding slices");
        for ifd in &slices {
            let layout = match SliceLayout::from_ifd(ifd) {
                Ok(layout) => layout,
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            };
            if (layout.width, layout.height) != (first_layout.width, first_layout.height) {
                progress.abandon();
                return Err(VolumeError::InvalidHeader(format!(
                    "IFD #{} is {}x{}, the first slice is {}x{}",
                    ifd.number, layout.width, layout.height, first_layout.width, first_layout.height
                )));
            }
            match slice_reader.read_slice(&mut reader, ifd, &layout) {
                Ok(samples) => data.extend_from_slice(&samples),
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            }
            progress.increment(1);
        }
        progress.finish();

        let volume = Volume::new([first_layout.width, first_layout.height, slices.len()], data)?
            .with_spacing(description.spacing)?
            .with_origin(description.origin)
            .with_direction(description.direction);
        info!("Loaded {}", volume);
        Ok(volume)
    }

    fn build_stack(&self, volume: &Volume, options: &WriteOptions) -> VolumeResult<TiffBuilder> {
        let [width, height, depth] = volume.dimensions();
        let width = u32::try_from(width)
            .map_err(|_| VolumeError::GenericError(format!("Slice width {} exceeds TIFF limits", width)))?;
        let height = u32::try_from(height)
            .map_err(|_| VolumeError::GenericError(format!("Slice height {} exceeds TIFF limits", height)))?;

        let handler = options.compression.handler();
        info!("Encoding {} slices with {}", depth, handler.name());

        let mut builder = TiffBuilder::new(false);
        let progress = ProgressTracker::new(depth as u64, "Encoding slices");
        for z in 0..depth {
            let slice = volume
                .slice(z)
                .ok_or_else(|| VolumeError::GenericError(format!("Slice {} missing from volume", z)))?;
            let strip = encode_samples_le(slice).and_then(|raw| handler.compress(&raw));
            let strip = match strip {
                Ok(strip) => strip,
                Err(e) => {
                    progress.abandon();
                    return Err(e);
                }
            };

            let ifd_index = builder.add_ifd(IFD::new(z, 0));
            builder.add_float_slice_tags(ifd_index, width, height, handler.code())?;
            if ifd_index == 0 {
                builder.add_ascii_tag(ifd_index, tags::IMAGE_DESCRIPTION, &VolumeDescription::for_volume(volume).render())?;
                builder.add_ascii_tag(
                    ifd_index,
                    tags::SOFTWARE,
                    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
                )?;
            }
            builder.setup_single_strip(ifd_index, strip)?;
            progress.increment(1);
        }
        progress.finish();

        if builder.file_size() > header::CLASSIC_TIFF_LIMIT {
            builder.promote_to_big_tiff();
        }
        Ok(builder)
    }
}

impl Default for TiffVolumeFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeFormat for TiffVolumeFormat {
    fn name(&self) -> &'static str {
        "TIFF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tif", "tiff"]
    }

    fn read(&self, path: &str) -> VolumeResult<Volume> {
        self.read_stack(path)
    }

    fn write(&self, volume: &Volume, path: &str, options: &WriteOptions) -> VolumeResult<()> {
        let builder = self.build_stack(volume, options)?;
        builder.write(path)
    }
}

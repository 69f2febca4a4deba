//! Bounding-box extraction command
//!
//! Load, crop, and optionally write: the whole pipeline of the binary.

use clap::ArgMatches;
use log::info;

use crate::api::{read_image, write_image_with_options};
use crate::commands::command_traits::Command;
use crate::extractor::{extract, ExtractionRequest};
use crate::volume::errors::VolumeResult;

/// Command that extracts one region and writes it out
pub struct BoundingBoxCommand {
    request: ExtractionRequest,
}

impl BoundingBoxCommand {
    /// Create the command from parsed arguments
    pub fn new(args: &ArgMatches) -> VolumeResult<Self> {
        info!("Creating bounding-box command from arguments");
        Ok(BoundingBoxCommand {
            request: ExtractionRequest::from_matches(args)?,
        })
    }

    pub fn request(&self) -> &ExtractionRequest {
        &self.request
    }
}

impl Command for BoundingBoxCommand {
    fn execute(&self) -> VolumeResult<()> {
        let volume = read_image(&self.request.input)?;
        info!("Input volume: {}", volume);

        let region = self.request.region();
        let cropped = extract(&volume, &region)?;
        info!("Extraction successful: {}", cropped);

        write_image_with_options(&cropped, self.request.output.as_deref(), &self.request.write_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_cli;
    use crate::volume::errors::VolumeError;

    #[test]
    fn missing_input_surfaces_as_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.mha").to_string_lossy().into_owned();
        let matches = build_cli()
            .try_get_matches_from([
                "volcrop", "-i", path.as_str(), "-x", "0", "-y", "0", "-z", "0", "-u", "1", "-v",
                "1", "-w", "1",
            ])
            .unwrap();
        let command = BoundingBoxCommand::new(&matches).unwrap();
        assert_eq!(command.request().input, path);
        assert!(matches!(command.execute(), Err(VolumeError::ImageLoad { .. })));
    }
}

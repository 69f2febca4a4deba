//! Extraction request built from command-line arguments

use clap::ArgMatches;
use log::{debug, info};

use crate::compression::CompressionKind;
use crate::io::format_strategy::WriteOptions;
use crate::volume::errors::{VolumeError, VolumeResult};

use super::region::Region;

/// Output value that historically meant "extract without writing"
pub const NO_OUTPUT_SENTINEL: &str = "None";

/// Caller-supplied parameters for one extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    /// Source volume path
    pub input: String,
    /// Destination path; None means extraction only
    pub output: Option<String>,
    /// Start index per axis
    pub index: [u16; 3],
    /// Extent per axis
    pub size: [u16; 3],
    /// Whether the output should be compressed
    pub compress: bool,
    /// Codec applied when `compress` is set
    pub compression: CompressionKind,
}

impl ExtractionRequest {
    /// Builds a request from parsed arguments (see [`crate::cli::build_cli`])
    pub fn from_matches(args: &ArgMatches) -> VolumeResult<Self> {
        let input = args
            .get_one::<String>("input")
            .cloned()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("input"))?;
        info!("Input file: {}", input);

        let output = normalize_output(args.get_one::<String>("output").cloned());
        info!("Output file: {:?}", output);

        let index = [
            required_u16(args, "index_x")?,
            required_u16(args, "index_y")?,
            required_u16(args, "index_z")?,
        ];
        let size = [
            required_u16(args, "size_x")?,
            required_u16(args, "size_y")?,
            required_u16(args, "size_z")?,
        ];
        debug!("Index: {:?}, size: {:?}", index, size);

        let compress = args.get_flag("compress");
        let compression = match args.get_one::<String>("compression-name") {
            Some(name) => CompressionKind::from_name(name).map_err(|e| VolumeError::ArgumentParse {
                argument: "compression-name".to_string(),
                message: e.to_string(),
            })?,
            None => CompressionKind::Deflate,
        };
        info!("Compression: {} ({})", compress, compression.name());

        Ok(ExtractionRequest { input, output, index, size, compress, compression })
    }

    /// Region described by the index and size triples
    pub fn region(&self) -> Region {
        Region::new(
            self.index.map(usize::from),
            self.size.map(usize::from),
        )
    }

    /// Options for the image sink
    pub fn write_options(&self) -> WriteOptions {
        if self.compress {
            WriteOptions::compressed(self.compression)
        } else {
            WriteOptions::uncompressed()
        }
    }
}

/// Maps a missing output or the legacy sentinel to None
pub fn normalize_output(output: Option<String>) -> Option<String> {
    output.filter(|path| !path.is_empty() && path != NO_OUTPUT_SENTINEL)
}

fn required_u16(args: &ArgMatches, name: &str) -> VolumeResult<u16> {
    args.get_one::<u16>(name).copied().ok_or_else(|| missing(name))
}

fn missing(name: &str) -> VolumeError {
    VolumeError::ArgumentParse {
        argument: name.to_string(),
        message: "required argument was not provided".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_cli;

    fn parse(args: &[&str]) -> ExtractionRequest {
        let matches = build_cli().try_get_matches_from(args).unwrap();
        ExtractionRequest::from_matches(&matches).unwrap()
    }

    #[test]
    fn builds_region_from_flags() {
        let request = parse(&[
            "volcrop", "-i", "in.mha", "-x", "2", "-y", "3", "-z", "4", "-u", "5", "-v", "6", "-w", "7",
        ]);
        assert_eq!(request.region(), Region::new([2, 3, 4], [5, 6, 7]));
        assert_eq!(request.output, None);
        assert!(!request.compress);
        assert_eq!(request.write_options(), WriteOptions::uncompressed());
    }

    #[test]
    fn sentinel_output_means_no_output() {
        let request = parse(&[
            "volcrop", "-i", "in.mha", "-o", "None", "-x", "0", "-y", "0", "-z", "0", "-u", "1",
            "-v", "1", "-w", "1",
        ]);
        assert_eq!(request.output, None);
    }

    #[test]
    fn compression_name_selects_codec() {
        let request = parse(&[
            "volcrop", "--input", "in.tif", "--output", "out.tif", "--index_x", "0", "--index_y",
            "0", "--index_z", "0", "--size_x", "1", "--size_y", "1", "--size_z", "1", "-c",
            "--compression-name", "zstd",
        ]);
        assert_eq!(request.output.as_deref(), Some("out.tif"));
        assert_eq!(request.write_options(), WriteOptions::compressed(CompressionKind::Zstd));
    }

    #[test]
    fn unknown_codec_is_an_argument_error() {
        let matches = build_cli()
            .try_get_matches_from([
                "volcrop", "-i", "a.mha", "-x", "0", "-y", "0", "-z", "0", "-u", "1", "-v", "1",
                "-w", "1", "--compression-name", "lzw",
            ])
            .unwrap();
        let err = ExtractionRequest::from_matches(&matches).unwrap_err();
        assert!(matches!(err, VolumeError::ArgumentParse { .. }));
    }
}

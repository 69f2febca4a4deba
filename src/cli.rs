//! Command-line definition
//!
//! The short flags and long names of the bounding-box options are fixed;
//! scripts drive the tool with them.

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

/// Builds the argument parser for the `volcrop` binary
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("volcrop")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract a bounding box from a 3D volume")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Input volume (.mha, .mhd, .tif, .tiff)")
                .value_name("FILE")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output volume; omit or pass None to skip writing")
                .value_name("FILE")
                .required(false),
        )
        .arg(index_arg("index_x", 'x', "Start index along x"))
        .arg(index_arg("index_y", 'y', "Start index along y"))
        .arg(index_arg("index_z", 'z', "Start index along z"))
        .arg(index_arg("size_x", 'u', "Extent along x"))
        .arg(index_arg("size_y", 'v', "Extent along y"))
        .arg(index_arg("size_z", 'w', "Extent along z"))
        .arg(
            Arg::new("compress")
                .short('c')
                .long("compress")
                .help("Compress the output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compression-name")
                .long("compression-name")
                .help("Codec used with --compress (none, deflate, zstd)")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Mirror log records into this file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

fn index_arg(name: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(name)
        .short(short)
        .long(name)
        .help(help)
        .value_name("N")
        .value_parser(value_parser!(u16))
        .required(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    const BASE: [&str; 15] = [
        "volcrop", "-i", "in.mha", "-x", "0", "-y", "0", "-z", "0", "-u", "1", "-v", "1", "-w", "1",
    ];

    #[test]
    fn definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn accepts_short_flags() {
        let matches = build_cli().try_get_matches_from(BASE).unwrap();
        assert_eq!(matches.get_one::<String>("input").map(String::as_str), Some("in.mha"));
        assert_eq!(matches.get_one::<u16>("size_z"), Some(&1));
        assert!(!matches.get_flag("compress"));
        assert!(!matches.get_flag("verbose"));
    }

    #[test]
    fn rejects_values_above_u16() {
        let mut args = BASE.to_vec();
        args[4] = "65536";
        let err = build_cli().try_get_matches_from(args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn accepts_u16_max() {
        let mut args = BASE.to_vec();
        args[4] = "65535";
        let matches = build_cli().try_get_matches_from(args).unwrap();
        assert_eq!(matches.get_one::<u16>("index_x"), Some(&u16::MAX));
    }

    #[test]
    fn rejects_negative_index() {
        let mut args = BASE.to_vec();
        args[6] = "-1";
        assert!(build_cli().try_get_matches_from(args).is_err());
    }

    #[test]
    fn missing_size_flag_is_rejected() {
        let err = build_cli().try_get_matches_from(&BASE[..13]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}

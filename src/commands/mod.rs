//! CLI command implementations
//!
//! Commands wrap the library pipeline using the Command pattern.

pub mod command_traits;
pub mod bounding_box_command;

pub use command_traits::{Command, CommandFactory};
pub use bounding_box_command::BoundingBoxCommand;

use clap::ArgMatches;

use crate::volume::errors::VolumeResult;

/// Factory for creating command instances based on CLI arguments
pub struct VolcropCommandFactory;

impl VolcropCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        VolcropCommandFactory
    }
}

impl Default for VolcropCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for VolcropCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> VolumeResult<Box<dyn Command>> {
        Ok(Box::new(BoundingBoxCommand::new(args)?))
    }
}

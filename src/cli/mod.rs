pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, InspectArgs, ResolveArgs};
pub use output::{OutputFormat, OutputFormatter};

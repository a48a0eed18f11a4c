//! Subcommand handlers; each returns the process exit code

use super::commands::{InspectArgs, ResolveArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::LinkPathConfig;
use crate::module::ToolchainHome;
use crate::report::{inspect_artifacts, ResolutionReport};
use crate::resolution::ModulePathResolver;
use std::path::Path;
use tracing::{debug, error, info};

fn emit(output: &str, target: Option<&Path>, quiet: bool) -> i32 {
    match target {
        Some(file) => match std::fs::write(file, output) {
            Ok(_) => {
                info!("Output written to: {}", file.display());
                if !quiet {
                    println!("Output written to: {}", file.display());
                }
                0
            }
            Err(e) => {
                error!("Failed to write output to file: {}", e);
                1
            }
        },
        None => {
            println!("{}", output);
            0
        }
    }
}

pub fn handle_resolve(args: &ResolveArgs, quiet: bool) -> i32 {
    info!("Loading configuration: {}", args.config.display());

    let config = match LinkPathConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return 1;
        }
    };
    debug!("{}", config);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check the patterns and paths in {}.", args.config.display());
        return 1;
    }

    let resolver = match ModulePathResolver::from_config(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };
    let resolver = resolver.with_deduplicate(args.deduplicate.then_some(true));

    let resolution = match resolver.resolve(&config.dependencies(), &config) {
        Ok(resolution) => resolution,
        Err(e) => {
            error!("Resolution failed: {:#}", e);
            return 1;
        }
    };

    let report = ResolutionReport::from_resolution(&resolution);
    let format: OutputFormat = args.format.into();
    let output = match OutputFormatter::new(format).format_report(&report) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {}", e);
            return 1;
        }
    };

    emit(&output, args.output.as_deref(), quiet)
}

pub fn handle_inspect(args: &InspectArgs) -> i32 {
    let toolchain = match &args.toolchain_home {
        Some(home) => match ToolchainHome::open(home) {
            Ok(toolchain) => Some(toolchain),
            Err(e) => {
                error!("{:#}", e);
                return 1;
            }
        },
        None => None,
    };

    let inspected = inspect_artifacts(&args.paths, toolchain.as_ref());
    let failures = inspected.iter().filter(|a| a.error.is_some()).count();

    let format: OutputFormat = args.format.into();
    let output = match OutputFormatter::new(format).format_inspection(&inspected) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {}", e);
            return 1;
        }
    };
    println!("{}", output);

    if failures > 0 {
        error!("{} of {} artifacts could not be read", failures, inspected.len());
        1
    } else {
        0
    }
}

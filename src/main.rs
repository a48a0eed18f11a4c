use jlinkpath::cli::commands::{CliArgs, Commands};
use jlinkpath::cli::handlers::{handle_inspect, handle_resolve};
use jlinkpath::util::logging::{parse_level, LoggingConfig, LOG_LEVEL_ENV};
use jlinkpath::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("jlinkpath v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Resolve(resolve_args) => handle_resolve(resolve_args, args.quiet),
        Commands::Inspect(inspect_args) => handle_inspect(inspect_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();
    config.level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else if env::var(LOG_LEVEL_ENV).is_ok() {
        config.level
    } else {
        Level::INFO
    };

    jlinkpath::util::init_logging(config);
}

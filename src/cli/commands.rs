use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "jlinkpath.toml";

/// Module path resolution and dependency filtering for jlink
#[derive(Parser, Debug)]
#[command(
    name = "jlinkpath",
    about = "Module path resolution and dependency filtering for jlink",
    version,
    author,
    long_about = "jlinkpath reads the module descriptors of a project and its dependencies, \
                  applies the configured path elements, file-sets, dir-sets and dependency-sets \
                  and prints the resulting module path together with a classification of every \
                  candidate."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Verbose output (debug logging)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Resolve the module path of a project",
        long_about = "Resolves module descriptors, applies the dependency filters and assembles \
                      the module path described by a configuration file.\n\n\
                      Examples:\n  \
                      jlinkpath resolve\n  \
                      jlinkpath resolve --config app/jlinkpath.toml\n  \
                      jlinkpath resolve --format json --output report.json\n  \
                      jlinkpath resolve --deduplicate"
    )]
    Resolve(ResolveArgs),

    #[command(
        about = "Show module descriptors of artifacts",
        long_about = "Reads the module descriptor of each given jar, jmod, exploded directory \
                      or module-info.class and prints it.\n\n\
                      Examples:\n  \
                      jlinkpath inspect libs/*.jar\n  \
                      jlinkpath inspect target/classes --format yaml"
    )]
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(
        short = 'c',
        long,
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE,
        help = "Configuration file"
    )]
    pub config: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Drop repeated module path entries (first occurrence wins)")]
    pub deduplicate: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    #[arg(value_name = "PATH", required = true, help = "Artifacts to inspect")]
    pub paths: Vec<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Toolchain home used to pick multi-release descriptors"
    )]
    pub toolchain_home: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Turns a business idea into an investor-ready pitch deck
#[derive(Parser, Debug)]
#[command(
    name = "pitchflow-cli",
    version,
    about = "Turns a business idea into an investor-ready pitch deck",
    long_about = "pitchflow-cli runs the startup strategist pipeline: nine LLM stages that \
                  refine the idea, research the problem, customer and competitors, and end \
                  with a pitch deck outline and a memory record.\n\n\
                  Examples:\n  \
                  pitchflow-cli \"An app that matches dog walkers with busy pet owners\"\n  \
                  echo \"Solar-powered e-bike rentals\" | pitchflow-cli --format json\n  \
                  pitchflow-cli --config pitchflow.toml --no-search -o result.json \"...\""
)]
pub struct CliArgs {
    #[arg(value_name = "IDEA", help = "The business idea (read from stdin when omitted)")]
    pub idea: Option<String>,

    #[arg(short = 'c', long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(short = 'm', long, value_name = "MODEL", help = "Default model for every stage")]
    pub model: Option<String>,

    #[arg(long, help = "Skip web research even when credentials are configured")]
    pub no_search: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "text",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Also write the full JSON result to a file"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Print the configured stages and exit")]
    pub list_stages: bool,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Verbose logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - only errors are logged"
    )]
    pub quiet: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Text,
    Json,
}

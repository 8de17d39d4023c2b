mod cli;
mod handler;
mod output;

use clap::Parser;
use std::env;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::CliArgs;
use pitchflow::VERSION;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(&args);

    debug!("pitchflow v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = handler::handle(&args).await;
    std::process::exit(exit_code);
}

fn init_logging(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let mut filter = EnvFilter::from_default_env();
    if env::var("RUST_LOG").is_err() {
        for directive in [
            format!("pitchflow={level}"),
            format!("pitchflow_cli={level}"),
            "hyper=warn".to_string(),
            "reqwest=warn".to_string(),
        ] {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{level_str}', defaulting to WARN. Valid levels: trace, debug, info, warn, error"
            );
            Level::WARN
        }
    }
}

//! Runs the strategist pipeline for one invocation.

use anyhow::{bail, Context, Result};
use pitchflow::config::PitchflowConfig;
use pitchflow::events::LoggingEventSink;
use pitchflow::llm::GeminiClient;
use pitchflow::pipeline::{Pipeline, PipelineRunner};
use pitchflow::strategist::build_pipeline;
use pitchflow::websearch::GoogleSearchClient;
use std::io::{IsTerminal, Read};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::cli::CliArgs;
use crate::output;

/// Every stage completed.
pub const EXIT_OK: i32 = 0;
/// A stage failed; partial artifacts were printed.
pub const EXIT_RUN_FAILED: i32 = 1;
/// Bad configuration, bad input or unusable credentials. Nothing ran.
pub const EXIT_CONFIG: i32 = 2;

pub async fn handle(args: &CliArgs) -> i32 {
    let (config, pipeline) = match prepare(args) {
        Ok(prepared) => prepared,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            return EXIT_CONFIG;
        }
    };

    if args.list_stages {
        print!("{}", output::render_stages(&pipeline));
        return EXIT_OK;
    }

    let runner = match build_runner(&config, pipeline) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("error: {e:#}");
            return EXIT_CONFIG;
        }
    };

    let idea = match read_idea(args.idea.as_deref()) {
        Ok(idea) => idea,
        Err(e) => {
            eprintln!("error: {e:#}");
            return EXIT_CONFIG;
        }
    };

    info!(stages = runner.pipeline().stage_count(), "Running strategist pipeline");
    let result = runner.run(idea).await;

    if let Some(path) = &args.output {
        if let Err(e) = output::write_json(&result, path) {
            eprintln!("error: {e:#}");
            return EXIT_RUN_FAILED;
        }
    }

    match output::render(&result, args.format) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            return EXIT_RUN_FAILED;
        }
    }

    if let Some(failure) = result.failure() {
        eprintln!("error: {failure}");
        return EXIT_RUN_FAILED;
    }
    EXIT_OK
}

/// Loads the configuration layers and defines the pipeline.
fn prepare(args: &CliArgs) -> Result<(PitchflowConfig, Pipeline)> {
    let config = match &args.config {
        Some(path) => PitchflowConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PitchflowConfig::default(),
    };
    let mut config = config.apply_env()?;

    if let Some(model) = &args.model {
        config.llm.model.clone_from(model);
    }
    if args.no_search {
        config.search.enabled = false;
    }
    if config.search.enabled && !config.search.has_credentials() && !args.list_stages {
        warn!("Search credentials are not set; research stages will run without web search");
        config.search.enabled = false;
    }

    let pipeline = build_pipeline(&config).context("Invalid pipeline configuration")?;
    Ok((config, pipeline))
}

fn build_runner(config: &PitchflowConfig, pipeline: Pipeline) -> Result<PipelineRunner> {
    let llm = GeminiClient::new(&config.llm)
        .context("Cannot create the Gemini client; set GEMINI_API_KEY or GOOGLE_API_KEY")?;
    let needs_search = pipeline.requires_search();

    let mut runner = PipelineRunner::new(Arc::new(pipeline), Arc::new(llm))
        .with_event_sink(Arc::new(LoggingEventSink::default()));
    if needs_search {
        let search = GoogleSearchClient::new(&config.search)
            .context("Cannot create the search client")?;
        runner = runner.with_search(Arc::new(search));
    }
    Ok(runner)
}

/// Takes the idea from the argument, or from stdin when it is not a terminal.
fn read_idea(arg: Option<&str>) -> Result<String> {
    let idea = match arg {
        Some(idea) => idea.to_string(),
        None => {
            let mut stdin = std::io::stdin();
            if stdin.is_terminal() {
                bail!("No idea given; pass it as an argument or pipe it on stdin");
            }
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .context("Failed to read the idea from stdin")?;
            buffer
        }
    };
    normalize_idea(&idea)
}

fn normalize_idea(raw: &str) -> Result<String> {
    let idea = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if idea.is_empty() {
        bail!("The idea is empty");
    }
    Ok(idea)
}

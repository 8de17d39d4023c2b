//! Rendering of run results.

use anyhow::{Context, Result};
use pitchflow::pipeline::{Pipeline, RunResult};
use std::fmt::Write as _;
use std::path::Path;

use crate::cli::OutputFormatArg;

/// Renders a run result for stdout.
pub fn render(result: &RunResult, format: OutputFormatArg) -> Result<String> {
    match format {
        OutputFormatArg::Json => render_json(result),
        OutputFormatArg::Text => Ok(render_text(result)),
    }
}

fn render_json(result: &RunResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize run result")
}

/// Renders each artifact under a heading, followed by a one-line summary.
pub fn render_text(result: &RunResult) -> String {
    let mut out = String::new();

    for (key, value) in result.artifacts() {
        let _ = writeln!(out, "## {}\n\n{}\n", heading(key), value);
    }

    match result.failure() {
        Some(failure) => {
            let _ = writeln!(
                out,
                "Run {} stopped after {} completed stages: {}",
                result.run_id,
                failure.stage_index - 1,
                failure
            );
        }
        None => {
            let _ = writeln!(
                out,
                "Run {} completed {} stages in {:.1}s",
                result.run_id,
                result.stages.len(),
                result.duration_ms / 1000.0
            );
        }
    }
    out
}

/// Lists the stages of a pipeline, one per line.
pub fn render_stages(pipeline: &Pipeline) -> String {
    let mut out = String::new();
    for (i, stage) in pipeline.stages().iter().enumerate() {
        let search = if stage.uses_search() { " [search]" } else { "" };
        let _ = writeln!(
            out,
            "{:>2}. {:<20} -> {:<13} {}{}",
            i + 1,
            stage.name,
            stage.output_key,
            pipeline.model_for(stage),
            search
        );
    }
    out
}

/// Writes the JSON result to `path`.
pub fn write_json(result: &RunResult, path: &Path) -> Result<()> {
    let json = render_json(result)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write result to {}", path.display()))
}

fn heading(key: &str) -> String {
    match key {
        "refined_idea" => "Refined Idea".to_string(),
        "gtm" => "Go-to-Market".to_string(),
        "mvp" => "MVP".to_string(),
        other => other
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchflow::context::{RunIdentity, SharedContext};
    use pitchflow::core::{FailureCause, RunState, StageFailure};
    use pitchflow::errors::SearchError;
    use pitchflow::strategist::startup_strategist;
    use pretty_assertions::assert_eq;

    fn failed_result() -> RunResult {
        let identity = RunIdentity::new("startup_strategist");
        let mut context = SharedContext::seeded("dog walkers");
        context.insert("refined_idea", "DogGo: on-demand walks").unwrap();

        RunResult {
            run_id: identity.pipeline_run_id,
            pipeline: identity.pipeline_name,
            state: RunState::Failed(StageFailure {
                stage_index: 2,
                stage_name: "problem_statement".to_string(),
                output_key: "problem".to_string(),
                cause: FailureCause::Search(SearchError::no_results("q")),
            }),
            context,
            stages: Vec::new(),
            started_at: identity.started_at,
            duration_ms: 12.0,
        }
    }

    #[test]
    fn test_text_shows_partial_artifacts_and_failure() {
        let result = failed_result();
        let text = render_text(&result);

        assert!(text.starts_with("## Refined Idea\n\nDogGo: on-demand walks\n"));
        assert!(text.contains("stopped after 1 completed stages"));
        assert!(text.contains("SearchError"));
    }

    #[test]
    fn test_json_round_trips_through_serde_json() {
        let json = render(&failed_result(), OutputFormatArg::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["state"]["stage_name"], "problem_statement");
        assert_eq!(value["context"]["idea"], "dog walkers");
    }

    #[test]
    fn test_write_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");

        write_json(&failed_result(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"pipeline\": \"startup_strategist\""));
    }

    #[test]
    fn test_headings() {
        assert_eq!(heading("refined_idea"), "Refined Idea");
        assert_eq!(heading("pitch_deck"), "Pitch Deck");
        assert_eq!(heading("gtm"), "Go-to-Market");
    }

    #[test]
    fn test_stage_listing() {
        let listing = render_stages(&startup_strategist().unwrap());
        let lines: Vec<&str> = listing.lines().collect();

        assert_eq!(lines.len(), 9);
        assert!(lines[1].contains("problem_statement"));
        assert!(lines[1].ends_with("[search]"));
        assert!(!lines[0].contains("[search]"));
    }
}

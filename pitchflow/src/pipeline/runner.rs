//! Sequential execution of a validated pipeline.

use super::{Pipeline, RunResult, StageSpec};
use crate::context::{RunIdentity, SharedContext};
use crate::core::{FailureCause, RunState, StageFailure, StageRecord, StageStatus};
use crate::errors::{LlmError, SearchError};
use crate::events::{self, EventSink, NoOpEventSink};
use crate::llm::LlmClient;
use crate::websearch::{format_research_section, SearchClient};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Executes a pipeline one stage at a time.
///
/// The runner holds no per-run state: every call to [`run`](Self::run)
/// creates its own context and identity, so one runner may serve concurrent
/// runs. Within a run, stage *i + 1* never starts before stage *i* returns.
pub struct PipelineRunner {
    pipeline: Arc<Pipeline>,
    llm: Arc<dyn LlmClient>,
    search: Option<Arc<dyn SearchClient>>,
    events: Arc<dyn EventSink>,
}

/// What a successful stage hands back to the run loop.
struct StageOutcome {
    content: String,
    search_hits: usize,
    prompt_chars: usize,
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

/// Partial measurements of a stage that failed.
#[derive(Default)]
struct StageProgress {
    search_hits: usize,
    prompt_chars: usize,
}

impl PipelineRunner {
    /// Creates a runner without a search client.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            pipeline,
            llm,
            search: None,
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the search client used by search-capable stages.
    #[must_use]
    pub fn with_search(mut self, search: Arc<dyn SearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the pipeline this runner executes.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Runs the pipeline on `initial_input` with a fresh run identity.
    pub async fn run(&self, initial_input: impl Into<String>) -> RunResult {
        let identity = RunIdentity::new(self.pipeline.name());
        self.run_with_identity(identity, initial_input).await
    }

    /// Runs the pipeline under a caller-provided identity.
    ///
    /// Never returns an error: a stage failure aborts the run and is reported
    /// through [`RunResult::state`].
    pub async fn run_with_identity(
        &self,
        identity: RunIdentity,
        initial_input: impl Into<String>,
    ) -> RunResult {
        let start = Instant::now();
        let run_id = identity.pipeline_run_id_str();
        let mut context = SharedContext::seeded(initial_input);
        let mut state = RunState::NotStarted;
        let mut records = Vec::with_capacity(self.pipeline.stage_count());

        info!(
            pipeline = %self.pipeline.name(),
            run_id = %run_id,
            stages = self.pipeline.stage_count(),
            "Pipeline run started"
        );
        self.events
            .emit(
                events::PIPELINE_STARTED,
                Some(json!({
                    "pipeline_run_id": run_id,
                    "pipeline": self.pipeline.name(),
                    "stage_count": self.pipeline.stage_count(),
                })),
            )
            .await;

        for (position, stage) in self.pipeline.stages().iter().enumerate() {
            let stage_index = position + 1;
            transition(&mut state, RunState::Running { stage_index });

            let model = self.pipeline.model_for(stage);
            self.events
                .emit(
                    events::STAGE_STARTED,
                    Some(json!({
                        "pipeline_run_id": run_id,
                        "stage": stage.name,
                        "stage_index": stage_index,
                        "model": model,
                    })),
                )
                .await;

            let stage_start = Instant::now();
            let mut progress = StageProgress::default();
            let outcome = self
                .execute_stage(&run_id, stage, model, &context, &mut progress)
                .await
                .and_then(|outcome| {
                    context.insert(stage.output_key.clone(), outcome.content.clone())?;
                    Ok(outcome)
                });
            let duration_ms = stage_start.elapsed().as_secs_f64() * 1000.0;

            let mut record = StageRecord {
                stage_index,
                stage_name: stage.name.clone(),
                output_key: stage.output_key.clone(),
                model: model.to_string(),
                capability: stage.capability,
                status: StageStatus::Ok,
                search_hits: progress.search_hits,
                prompt_chars: progress.prompt_chars,
                duration_ms,
                input_tokens: None,
                output_tokens: None,
            };

            match outcome {
                Ok(outcome) => {
                    record.search_hits = outcome.search_hits;
                    record.prompt_chars = outcome.prompt_chars;
                    record.input_tokens = outcome.input_tokens;
                    record.output_tokens = outcome.output_tokens;
                    records.push(record);

                    info!(
                        run_id = %run_id,
                        stage = %stage.name,
                        stage_index,
                        output_key = %stage.output_key,
                        duration_ms,
                        "Stage completed"
                    );
                    self.events
                        .emit(
                            events::STAGE_COMPLETED,
                            Some(json!({
                                "pipeline_run_id": run_id,
                                "stage": stage.name,
                                "stage_index": stage_index,
                                "output_key": stage.output_key,
                                "output_chars": outcome.content.len(),
                                "duration_ms": duration_ms,
                            })),
                        )
                        .await;
                }
                Err(cause) => {
                    record.status = StageStatus::Fail;
                    records.push(record);

                    let failure = StageFailure {
                        stage_index,
                        stage_name: stage.name.clone(),
                        output_key: stage.output_key.clone(),
                        cause,
                    };
                    error!(run_id = %run_id, "Pipeline aborted: {}", failure);

                    self.events
                        .emit(
                            events::STAGE_FAILED,
                            Some(json!({
                                "pipeline_run_id": run_id,
                                "stage": stage.name,
                                "stage_index": stage_index,
                                "error_kind": failure.cause.kind(),
                                "error": failure.cause.to_string(),
                                "duration_ms": duration_ms,
                            })),
                        )
                        .await;
                    self.events
                        .emit(
                            events::PIPELINE_FAILED,
                            Some(json!({
                                "pipeline_run_id": run_id,
                                "stage_index": stage_index,
                                "completed_stages": stage_index - 1,
                            })),
                        )
                        .await;

                    transition(&mut state, RunState::Failed(failure));
                    return finish(identity, state, context, records, start);
                }
            }
        }

        transition(&mut state, RunState::Completed);
        let result = finish(identity, state, context, records, start);

        info!(
            run_id = %run_id,
            duration_ms = result.duration_ms,
            artifacts = result.context.len() - 1,
            "Pipeline run completed"
        );
        self.events
            .emit(
                events::PIPELINE_COMPLETED,
                Some(json!({
                    "pipeline_run_id": run_id,
                    "duration_ms": result.duration_ms,
                    "total_tokens": result.total_tokens(),
                })),
            )
            .await;

        result
    }

    /// Renders, optionally searches, and calls the LLM for one stage.
    async fn execute_stage(
        &self,
        run_id: &str,
        stage: &StageSpec,
        model: &str,
        context: &SharedContext,
        progress: &mut StageProgress,
    ) -> Result<StageOutcome, FailureCause> {
        let mut prompt = stage.template.render(context)?;

        if stage.uses_search() {
            let query = search_query(stage, context)?;
            let hits = self.search(&query).await?;
            progress.search_hits = hits.len();

            debug!(stage = %stage.name, query = %query, hits = hits.len(), "Folding search results");
            self.events
                .emit(
                    events::STAGE_SEARCH_COMPLETED,
                    Some(json!({
                        "pipeline_run_id": run_id,
                        "stage": stage.name,
                        "query": query,
                        "hits": hits.len(),
                    })),
                )
                .await;

            prompt.push_str(&format_research_section(&query, &hits));
        }

        progress.prompt_chars = prompt.chars().count();
        debug!(
            stage = %stage.name,
            model = %model,
            prompt_chars = progress.prompt_chars,
            "Calling LLM"
        );

        let response = self.llm.complete(model, &prompt).await?;
        let content = response.content.trim();
        if content.is_empty() {
            warn!(stage = %stage.name, "LLM returned an empty response");
            return Err(LlmError::invalid_response("empty response").into());
        }

        Ok(StageOutcome {
            content: content.to_string(),
            search_hits: progress.search_hits,
            prompt_chars: progress.prompt_chars,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<crate::websearch::SearchHit>, SearchError> {
        let Some(client) = &self.search else {
            return Err(SearchError::Unavailable);
        };

        let hits = client.search(query).await?;
        if hits.is_empty() {
            return Err(SearchError::no_results(query));
        }
        Ok(hits)
    }
}

/// Renders the stage's search query.
///
/// Without an explicit query template, the query is the value of the first
/// placeholder in the prompt, or the initial input if there is none.
fn search_query(stage: &StageSpec, context: &SharedContext) -> Result<String, FailureCause> {
    if let Some(template) = &stage.search_query {
        return Ok(template.render(context)?);
    }

    let value = stage
        .template
        .placeholders()
        .first()
        .and_then(|key| context.get(key))
        .or_else(|| context.initial_input())
        .unwrap_or_default();
    Ok(value.to_string())
}

/// Moves the run to `next` if the state machine allows it.
fn transition(state: &mut RunState, next: RunState) {
    if state.can_transition_to(&next) {
        *state = next;
    } else {
        error!(from = %state, to = %next, "Rejected illegal run state transition");
    }
}

fn finish(
    identity: RunIdentity,
    state: RunState,
    context: SharedContext,
    stages: Vec<StageRecord>,
    start: Instant,
) -> RunResult {
    RunResult {
        run_id: identity.pipeline_run_id,
        pipeline: identity.pipeline_name,
        state,
        context,
        stages,
        started_at: identity.started_at,
        duration_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DataConflictError, TemplateResolutionError};
    use crate::events::CollectingEventSink;
    use crate::llm::{LlmResponse, MockLlmClient};
    use crate::pipeline::PipelineBuilder;
    use crate::websearch::{MockSearchClient, SearchHit};
    use pretty_assertions::assert_eq;

    fn two_stage_pipeline() -> Arc<Pipeline> {
        Arc::new(
            PipelineBuilder::define(
                "test",
                vec![
                    StageSpec::new("refine", "Refine: {idea}", "refined_idea"),
                    StageSpec::new("problem", "Problem of {refined_idea}", "problem")
                        .with_search_query("{refined_idea} market"),
                ],
            )
            .unwrap(),
        )
    }

    fn echo_llm() -> MockLlmClient {
        let mut llm = MockLlmClient::new();
        llm.expect_complete()
            .returning(|model, prompt| Ok(LlmResponse::text(format!("  {prompt}\n"), model.to_string())));
        llm
    }

    #[tokio::test]
    async fn test_search_results_are_folded_into_prompt() {
        let mut search = MockSearchClient::new();
        search
            .expect_search()
            .withf(|query| query.contains("Refine: an idea market"))
            .times(1)
            .returning(|_| Ok(vec![SearchHit::new("Report", "Big market", "https://r.io")]));

        let runner = PipelineRunner::new(two_stage_pipeline(), Arc::new(echo_llm()))
            .with_search(Arc::new(search));
        let result = runner.run("an idea").await;

        assert!(result.is_completed());
        let problem = result.artifact("problem").unwrap();
        assert!(problem.starts_with("Problem of Refine: an idea"));
        assert!(problem.contains("1. Report (https://r.io)"));
        assert_eq!(result.stages[1].search_hits, 1);
        assert_eq!(result.artifact("refined_idea"), Some("Refine: an idea"));
    }

    #[tokio::test]
    async fn test_missing_search_client_fails_stage() {
        let runner = PipelineRunner::new(two_stage_pipeline(), Arc::new(echo_llm()));
        let result = runner.run("an idea").await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.stage_index, 2);
        assert_eq!(failure.cause, FailureCause::Search(SearchError::Unavailable));
        assert_eq!(result.artifact_keys(), vec!["refined_idea"]);
    }

    #[tokio::test]
    async fn test_empty_search_results_are_no_results() {
        let mut search = MockSearchClient::new();
        search.expect_search().returning(|_| Ok(Vec::new()));

        let runner = PipelineRunner::new(two_stage_pipeline(), Arc::new(echo_llm()))
            .with_search(Arc::new(search));
        let result = runner.run("an idea").await;

        let failure = result.failure().unwrap();
        assert!(matches!(
            failure.cause,
            FailureCause::Search(SearchError::NoResults { .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_response_is_invalid() {
        let mut llm = MockLlmClient::new();
        llm.expect_complete()
            .returning(|model, _| Ok(LlmResponse::text("   \n", model.to_string())));

        let runner = PipelineRunner::new(two_stage_pipeline(), Arc::new(llm));
        let result = runner.run("an idea").await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.stage_index, 1);
        assert_eq!(failure.cause.kind(), "LLMError");
        assert_eq!(result.context.len(), 1);
        assert_eq!(result.stages[0].status, StageStatus::Fail);
    }

    #[tokio::test]
    async fn test_events_in_order() {
        let mut search = MockSearchClient::new();
        search
            .expect_search()
            .returning(|_| Ok(vec![SearchHit::new("t", "s", "https://u.io")]));
        let sink = Arc::new(CollectingEventSink::new());

        let runner = PipelineRunner::new(two_stage_pipeline(), Arc::new(echo_llm()))
            .with_search(Arc::new(search))
            .with_event_sink(sink.clone());
        let result = runner.run("an idea").await;

        assert_eq!(
            sink.event_types(),
            vec![
                "pipeline.started",
                "stage.started",
                "stage.completed",
                "stage.started",
                "stage.search_completed",
                "stage.completed",
                "pipeline.completed",
            ]
        );
        let run_id = result.run_id.to_string();
        for (_, data) in sink.events() {
            assert_eq!(data.unwrap()["pipeline_run_id"], run_id.as_str());
        }
    }

    #[test]
    fn test_default_search_query_uses_first_placeholder() {
        let mut context = SharedContext::seeded("raw idea");
        context.insert("refined_idea", "refined").unwrap();

        let stage = StageSpec::new("s", "About {refined_idea} and {idea}", "out").with_web_search();
        assert_eq!(search_query(&stage, &context).unwrap(), "refined");

        let literal = StageSpec::new("s", "No placeholders", "out").with_web_search();
        assert_eq!(search_query(&literal, &context).unwrap(), "raw idea");
    }

    /// Skips `define`, so the runner's own checks are the only guard.
    fn unvalidated(stages: Vec<StageSpec>) -> Arc<Pipeline> {
        Arc::new(Pipeline {
            name: "unvalidated".to_string(),
            description: String::new(),
            default_model: crate::pipeline::DEFAULT_MODEL.to_string(),
            stages,
        })
    }

    #[tokio::test]
    async fn test_unresolved_placeholder_fails_run() {
        let pipeline = unvalidated(vec![
            StageSpec::new("refine", "Refine: {idea}", "refined_idea"),
            StageSpec::new("customer", "Customer for {refined_idea}", "customer"),
            StageSpec::new("mvp", "MVP from {problem}", "mvp"),
        ]);
        let runner = PipelineRunner::new(pipeline, Arc::new(echo_llm()));
        let result = runner.run("an idea").await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.stage_index, 3);
        assert_eq!(failure.stage_name, "mvp");
        assert_eq!(failure.cause.kind(), "TemplateResolutionError");
        assert_eq!(
            failure.cause,
            FailureCause::Template(TemplateResolutionError::new("problem"))
        );
        assert_eq!(result.artifact_keys(), vec!["refined_idea", "customer"]);
        assert_eq!(result.stages.len(), 3);
        assert_eq!(result.stages[2].status, StageStatus::Fail);
        assert_eq!(result.stages[2].prompt_chars, 0);
    }

    #[tokio::test]
    async fn test_duplicate_output_key_fails_run() {
        let pipeline = unvalidated(vec![
            StageSpec::new("first", "One: {idea}", "draft"),
            StageSpec::new("second", "Two: {draft}", "draft"),
        ]);
        let runner = PipelineRunner::new(pipeline, Arc::new(echo_llm()));
        let result = runner.run("an idea").await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.stage_index, 2);
        assert_eq!(failure.cause.kind(), "DataConflictError");
        assert_eq!(
            failure.cause,
            FailureCause::Context(DataConflictError::new("draft"))
        );
        assert_eq!(result.artifact("draft"), Some("One: an idea"));
        assert_eq!(result.context.len(), 2);
    }

    #[test]
    fn test_illegal_transition_keeps_state() {
        let mut state = RunState::NotStarted;

        transition(&mut state, RunState::Completed);
        assert_eq!(state, RunState::NotStarted);

        transition(&mut state, RunState::Running { stage_index: 2 });
        assert_eq!(state, RunState::NotStarted);

        transition(&mut state, RunState::Running { stage_index: 1 });
        assert_eq!(state, RunState::Running { stage_index: 1 });
    }
}

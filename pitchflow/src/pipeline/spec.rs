//! Stage records and the validated pipeline definition.

use super::PromptTemplate;
use crate::context::INITIAL_INPUT_KEY;
use crate::core::StageCapability;
use crate::errors::{ContractErrorInfo, ContractSuggestions, PipelineValidationError};

/// Specification for a single stage in a pipeline.
///
/// A stage is pure configuration: a prompt template, the context key it
/// writes, and whether it searches the web first. One generic routine in the
/// runner executes every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    /// The unique name of the stage.
    pub name: String,
    /// Prompt template rendered against the context.
    pub template: PromptTemplate,
    /// External capability the stage uses.
    pub capability: StageCapability,
    /// Context key the stage's output is stored under.
    pub output_key: String,
    /// Model override; the pipeline default is used when unset.
    pub model: Option<String>,
    /// Template for the web-search query. Only valid with `WebSearch`.
    pub search_query: Option<PromptTemplate>,
}

impl StageSpec {
    /// Creates a new stage specification with no capabilities.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        template: impl Into<PromptTemplate>,
        output_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            capability: StageCapability::None,
            output_key: output_key.into(),
            model: None,
            search_query: None,
        }
    }

    /// Enables web search using the default query.
    #[must_use]
    pub fn with_web_search(mut self) -> Self {
        self.capability = StageCapability::WebSearch;
        self
    }

    /// Enables web search with an explicit query template.
    #[must_use]
    pub fn with_search_query(mut self, query: impl Into<PromptTemplate>) -> Self {
        self.capability = StageCapability::WebSearch;
        self.search_query = Some(query.into());
        self
    }

    /// Disables web search and drops any search query.
    #[must_use]
    pub fn without_search(mut self) -> Self {
        self.capability = StageCapability::None;
        self.search_query = None;
        self
    }

    /// Sets the model override.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Whether the stage searches before calling the LLM.
    #[must_use]
    pub fn uses_search(&self) -> bool {
        self.capability == StageCapability::WebSearch
    }

    /// Keys read by the prompt template and the search query, in order of
    /// first appearance.
    #[must_use]
    pub fn referenced_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        let query_keys = self
            .search_query
            .iter()
            .flat_map(|query| query.placeholders().iter());
        for key in self.template.placeholders().iter().chain(query_keys) {
            if !keys.contains(&key.as_str()) {
                keys.push(key.as_str());
            }
        }
        keys
    }

    /// Validates the stage on its own, independent of its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or output key is blank, the output key is
    /// reserved, the stage reads its own output, or a search query is set
    /// without search capability.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.name.trim().is_empty() || self.output_key.trim().is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' must have a non-empty name and output key",
                self.name
            ))
            .with_stages(vec![self.name.clone()])
            .with_error_info(ContractErrorInfo::new(
                ContractSuggestions::BLANK,
                "Blank stage name or output key",
            )));
        }

        if self.output_key == INITIAL_INPUT_KEY {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' cannot write the reserved key '{}'",
                self.name, INITIAL_INPUT_KEY
            ))
            .with_stages(vec![self.name.clone()])
            .with_error_info(ContractErrorInfo::new(
                ContractSuggestions::RESERVED_KEY,
                format!("'{INITIAL_INPUT_KEY}' holds the initial input"),
            )));
        }

        if self.referenced_keys().contains(&self.output_key.as_str()) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' references its own output key '{}'",
                self.name, self.output_key
            ))
            .with_stages(vec![self.name.clone()])
            .with_error_info(
                ContractErrorInfo::new(
                    ContractSuggestions::FORWARD_REF,
                    format!("'{}' is produced by the same stage", self.output_key),
                )
                .with_context_entry("key", &self.output_key),
            ));
        }

        if self.search_query.is_some() && !self.uses_search() {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' has a search query but no search capability",
                self.name
            ))
            .with_stages(vec![self.name.clone()])
            .with_error_info(ContractErrorInfo::new(
                ContractSuggestions::SEARCH_QUERY,
                "Search query without web search",
            )));
        }

        Ok(())
    }
}

/// A validated, immutable pipeline definition.
///
/// Built only through `PipelineBuilder`, so every instance satisfies the
/// ordering invariant: stage *i* reads only the initial input or keys written
/// by stages before it. Share it between runs with `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub(super) name: String,
    pub(super) description: String,
    pub(super) default_model: String,
    pub(super) stages: Vec<StageSpec>,
}

impl Pipeline {
    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the pipeline description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the model used by stages without an override.
    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns output keys in execution order.
    #[must_use]
    pub fn output_keys(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.output_key.as_str()).collect()
    }

    /// Looks up a stage by name.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&StageSpec> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Whether any stage needs a search client.
    #[must_use]
    pub fn requires_search(&self) -> bool {
        self.stages.iter().any(StageSpec::uses_search)
    }

    /// Returns the model a stage runs with.
    #[must_use]
    pub fn model_for<'a>(&'a self, stage: &'a StageSpec) -> &'a str {
        stage.model.as_deref().unwrap_or(&self.default_model)
    }
}

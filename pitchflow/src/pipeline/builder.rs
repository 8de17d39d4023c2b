//! Pipeline builder with validation.

use super::{Pipeline, StageSpec};
use crate::context::INITIAL_INPUT_KEY;
use crate::errors::{ContractErrorInfo, ContractSuggestions, PipelineValidationError};
use std::collections::HashSet;
use tracing::debug;

/// Model used by stages that do not override it.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Builder for creating validated pipelines.
///
/// Every stage is checked as it is added: its placeholders must name the
/// initial input or the output key of a stage added before it.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    /// The pipeline name.
    name: String,
    /// Human-readable description.
    description: String,
    /// Model for stages without an override.
    default_model: String,
    /// The stage specifications, in execution order.
    stages: Vec<StageSpec>,
    /// Keys readable by the next stage.
    available: HashSet<String>,
    /// Stage names added so far.
    names: HashSet<String>,
    /// Output keys of stages still to be added, when known up front.
    declared_later: HashSet<String>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            default_model: DEFAULT_MODEL.to_string(),
            stages: Vec::new(),
            available: HashSet::from([INITIAL_INPUT_KEY.to_string()]),
            names: HashSet::new(),
            declared_later: HashSet::new(),
        }
    }

    /// Defines a pipeline from an ordered list of stages.
    ///
    /// # Errors
    ///
    /// Returns a `PipelineValidationError` if a stage reads a key that is not
    /// produced before it, two stages share an output key or name, or the
    /// list is empty.
    pub fn define(
        name: impl Into<String>,
        stages: impl IntoIterator<Item = StageSpec>,
    ) -> Result<Pipeline, PipelineValidationError> {
        Self::new(name).stages(stages)?.build()
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Adds a stage to the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn stage(mut self, spec: StageSpec) -> Result<Self, PipelineValidationError> {
        self.add_stage_spec(spec)?;
        Ok(self)
    }

    /// Adds several stages in order.
    ///
    /// Because the whole list is known, a placeholder naming a key produced by
    /// a later stage is reported as a forward reference rather than an
    /// unknown key.
    ///
    /// # Errors
    ///
    /// Returns the first validation error.
    pub fn stages(
        mut self,
        specs: impl IntoIterator<Item = StageSpec>,
    ) -> Result<Self, PipelineValidationError> {
        let specs: Vec<StageSpec> = specs.into_iter().collect();
        self.declared_later
            .extend(specs.iter().map(|s| s.output_key.clone()));

        for spec in specs {
            self.add_stage_spec(spec)?;
        }
        self.declared_later.clear();
        Ok(self)
    }

    /// Adds a stage with a specification.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn add_stage_spec(&mut self, spec: StageSpec) -> Result<(), PipelineValidationError> {
        // Validate stage itself
        spec.validate()?;

        if self.names.contains(&spec.name) {
            return Err(PipelineValidationError::new(format!(
                "Duplicate stage name '{}'",
                spec.name
            ))
            .with_stages(vec![spec.name.clone()])
            .with_error_info(ContractErrorInfo::new(
                ContractSuggestions::DUPLICATE_NAME,
                format!("Stage '{}' is defined twice", spec.name),
            )));
        }

        if self.available.contains(&spec.output_key) {
            let owner = self
                .stages
                .iter()
                .find(|s| s.output_key == spec.output_key)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' writes output key '{}' already written by '{}'",
                spec.name, spec.output_key, owner
            ))
            .with_stages(vec![owner, spec.name.clone()])
            .with_error_info(
                ContractErrorInfo::new(
                    ContractSuggestions::DUPLICATE_OUTPUT,
                    format!("Output key '{}' is not unique", spec.output_key),
                )
                .with_context_entry("key", &spec.output_key),
            ));
        }

        // Check for keys not yet produced
        for key in spec.referenced_keys() {
            if self.available.contains(key) {
                continue;
            }

            let (code, summary) = if self.declared_later.contains(key) {
                (
                    ContractSuggestions::FORWARD_REF,
                    format!("'{key}' is produced by a later stage"),
                )
            } else {
                (
                    ContractSuggestions::UNRESOLVED_KEY,
                    format!("No earlier stage produces '{key}'"),
                )
            };

            return Err(PipelineValidationError::new(format!(
                "Stage '{}' references '{{{}}}' which is not available at position {}",
                spec.name,
                key,
                self.stages.len() + 1
            ))
            .with_stages(vec![spec.name.clone()])
            .with_error_info(
                ContractErrorInfo::new(code, summary)
                    .with_context_entry("key", key)
                    .with_context_entry("stage", &spec.name),
            ));
        }

        debug!(
            pipeline = %self.name,
            stage = %spec.name,
            output_key = %spec.output_key,
            capability = %spec.capability,
            "Stage accepted"
        );

        self.available.insert(spec.output_key.clone());
        self.names.insert(spec.name.clone());
        self.stages.push(spec);
        Ok(())
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no stages or no default model.
    pub fn build(self) -> Result<Pipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages")
                .with_error_info(ContractErrorInfo::new(
                    ContractSuggestions::EMPTY,
                    "Cannot build an empty pipeline",
                )));
        }

        if self.default_model.trim().is_empty() {
            return Err(PipelineValidationError::new("Pipeline default model is empty")
                .with_error_info(ContractErrorInfo::new(
                    ContractSuggestions::BLANK,
                    "Blank default model",
                )));
        }

        Ok(Pipeline {
            name: self.name,
            description: self.description,
            default_model: self.default_model,
            stages: self.stages,
        })
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

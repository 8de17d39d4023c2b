//! The startup strategist pipeline.
//!
//! Nine stages turn a raw business idea into a pitch deck and a closing
//! memory record. The three research stages search the web before prompting.

mod prompts;

use crate::config::PitchflowConfig;
use crate::errors::{
    ContractErrorInfo, ContractSuggestions, PipelineValidationError, PitchflowError,
};
use crate::pipeline::{Pipeline, PipelineBuilder, StageSpec};
use tracing::debug;

/// Name of the strategist pipeline.
pub const PIPELINE_NAME: &str = "startup_strategist";

/// Description of the strategist pipeline.
pub const PIPELINE_DESCRIPTION: &str =
    "Transforms a business idea into an investor-ready pitch deck through systematic analysis.";

/// Stage names in canonical order.
pub const CANONICAL_STAGE_NAMES: [&str; 9] = [
    "clarify_idea",
    "problem_statement",
    "target_customer",
    "mvp_planner",
    "competitor_analysis",
    "monetization",
    "go_to_market",
    "pitch_deck",
    "memory",
];

/// Output keys in canonical order.
pub const CANONICAL_OUTPUT_KEYS: [&str; 9] = [
    "refined_idea",
    "problem",
    "customer",
    "mvp",
    "competitors",
    "monetization",
    "gtm",
    "pitch_deck",
    "memory",
];

/// Returns the nine strategist stages in canonical order.
#[must_use]
pub fn canonical_stages() -> Vec<StageSpec> {
    vec![
        StageSpec::new("clarify_idea", prompts::CLARIFY_IDEA, "refined_idea"),
        StageSpec::new("problem_statement", prompts::PROBLEM_STATEMENT, "problem")
            .with_search_query(prompts::PROBLEM_QUERY),
        StageSpec::new("target_customer", prompts::TARGET_CUSTOMER, "customer")
            .with_search_query(prompts::CUSTOMER_QUERY),
        StageSpec::new("mvp_planner", prompts::MVP_PLANNER, "mvp"),
        StageSpec::new("competitor_analysis", prompts::COMPETITOR_ANALYSIS, "competitors")
            .with_search_query(prompts::COMPETITOR_QUERY),
        StageSpec::new("monetization", prompts::MONETIZATION, "monetization"),
        StageSpec::new("go_to_market", prompts::GO_TO_MARKET, "gtm"),
        StageSpec::new("pitch_deck", prompts::PITCH_DECK, "pitch_deck"),
        StageSpec::new("memory", prompts::MEMORY, "memory"),
    ]
}

/// Defines the strategist pipeline with default settings.
///
/// # Errors
///
/// Only fails if the built-in stages are inconsistent.
pub fn startup_strategist() -> Result<Pipeline, PipelineValidationError> {
    PipelineBuilder::new(PIPELINE_NAME)
        .with_description(PIPELINE_DESCRIPTION)
        .stages(canonical_stages())?
        .build()
}

/// Defines the strategist pipeline with configuration applied.
///
/// Applies the default model, per-stage model and search overrides, the
/// global search switch and `stage_order`. The result goes through the same
/// validation as any other definition, so an order that runs a stage before
/// its inputs exist is rejected.
///
/// # Errors
///
/// Returns `PitchflowError::Config` for out-of-range values and
/// `PitchflowError::Validation` for unknown stage names or invalid orderings.
pub fn build_pipeline(config: &PitchflowConfig) -> Result<Pipeline, PitchflowError> {
    config.validate()?;

    for name in config.stages.keys() {
        ensure_known(name, "stages")?;
    }

    let mut available = canonical_stages();
    let specs = match &config.stage_order {
        Some(order) => {
            let mut picked = Vec::with_capacity(order.len());
            for name in order {
                ensure_known(name, "stage_order")?;
                match available.iter().position(|s| &s.name == name) {
                    Some(at) => picked.push(available.remove(at)),
                    // Listed twice: let the builder report the duplicate.
                    None => picked.extend(canonical_stages().into_iter().filter(|s| &s.name == name)),
                }
            }
            picked
        }
        None => available,
    };

    let specs = specs.into_iter().map(|mut spec| {
        if let Some(stage) = config.stage_override(&spec.name) {
            if let Some(model) = &stage.model {
                spec = spec.with_model(model.clone());
            }
            match stage.search {
                Some(false) => spec = spec.without_search(),
                Some(true) if !spec.uses_search() => spec = spec.with_web_search(),
                _ => {}
            }
        }
        if !config.search.enabled {
            spec = spec.without_search();
        }
        spec
    });

    let pipeline = PipelineBuilder::new(PIPELINE_NAME)
        .with_description(PIPELINE_DESCRIPTION)
        .with_default_model(config.llm.model.clone())
        .stages(specs)?
        .build()?;

    debug!(
        stages = pipeline.stage_count(),
        requires_search = pipeline.requires_search(),
        default_model = %pipeline.default_model(),
        "Strategist pipeline built"
    );
    Ok(pipeline)
}

fn ensure_known(name: &str, field: &str) -> Result<(), PipelineValidationError> {
    if CANONICAL_STAGE_NAMES.contains(&name) {
        return Ok(());
    }

    Err(
        PipelineValidationError::new(format!("Unknown stage '{name}' in {field}"))
            .with_stages(vec![name.to_string()])
            .with_error_info(
                ContractErrorInfo::new(
                    ContractSuggestions::UNKNOWN_STAGE,
                    format!("'{name}' is not a strategist stage"),
                )
                .with_context_entry("field", field)
                .with_context_entry("known", CANONICAL_STAGE_NAMES.join(", ")),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageOverride;
    use crate::context::INITIAL_INPUT_KEY;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_pipeline() {
        let pipeline = startup_strategist().unwrap();

        assert_eq!(pipeline.name(), PIPELINE_NAME);
        assert_eq!(pipeline.description(), PIPELINE_DESCRIPTION);
        assert_eq!(pipeline.default_model(), "gemini-2.0-flash");
        assert_eq!(pipeline.output_keys(), CANONICAL_OUTPUT_KEYS.to_vec());

        let names: Vec<&str> = pipeline.stages().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, CANONICAL_STAGE_NAMES.to_vec());
    }

    #[test]
    fn test_search_stages() {
        let pipeline = startup_strategist().unwrap();
        let searching: Vec<&str> = pipeline
            .stages()
            .iter()
            .filter(|s| s.uses_search())
            .map(|s| s.output_key.as_str())
            .collect();

        assert_eq!(searching, vec!["problem", "customer", "competitors"]);
    }

    #[test]
    fn test_stage_references() {
        let pipeline = startup_strategist().unwrap();
        let refs = |name: &str| pipeline.stage(name).unwrap().referenced_keys();

        assert_eq!(refs("clarify_idea"), vec![INITIAL_INPUT_KEY]);
        assert_eq!(refs("mvp_planner"), vec!["refined_idea", "problem", "customer"]);
        assert_eq!(refs("go_to_market"), vec!["mvp", "customer"]);
        assert_eq!(refs("pitch_deck"), CANONICAL_OUTPUT_KEYS[..7].to_vec());
        assert_eq!(refs("memory"), CANONICAL_OUTPUT_KEYS[..8].to_vec());
    }

    #[test]
    fn test_default_config_matches_canonical() {
        let pipeline = build_pipeline(&PitchflowConfig::default()).unwrap();
        assert_eq!(pipeline, startup_strategist().unwrap());
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = PitchflowConfig::default();
        config.llm.model = "gemini-2.0-pro".to_string();
        config.stages.insert(
            "competitor_analysis".to_string(),
            StageOverride {
                model: Some("gemini-2.5-pro".to_string()),
                search: Some(false),
            },
        );
        config.stages.insert(
            "mvp_planner".to_string(),
            StageOverride {
                model: None,
                search: Some(true),
            },
        );

        let pipeline = build_pipeline(&config).unwrap();
        let competitors = pipeline.stage("competitor_analysis").unwrap();

        assert_eq!(pipeline.default_model(), "gemini-2.0-pro");
        assert_eq!(pipeline.model_for(competitors), "gemini-2.5-pro");
        assert!(!competitors.uses_search());
        assert!(pipeline.stage("mvp_planner").unwrap().uses_search());
    }

    #[test]
    fn test_search_disabled_globally() {
        let mut config = PitchflowConfig::default();
        config.search.enabled = false;

        let pipeline = build_pipeline(&config).unwrap();
        assert!(!pipeline.requires_search());
    }

    #[test]
    fn test_stage_order_subset() {
        let config = PitchflowConfig {
            stage_order: Some(vec![
                "clarify_idea".to_string(),
                "competitor_analysis".to_string(),
                "monetization".to_string(),
            ]),
            ..PitchflowConfig::default()
        };

        let pipeline = build_pipeline(&config).unwrap();
        assert_eq!(
            pipeline.output_keys(),
            vec!["refined_idea", "competitors", "monetization"]
        );
    }

    #[test]
    fn test_stage_order_with_missing_inputs() {
        let config = PitchflowConfig {
            stage_order: Some(vec!["clarify_idea".to_string(), "pitch_deck".to_string()]),
            ..PitchflowConfig::default()
        };

        let err = build_pipeline(&config).unwrap_err();
        let PitchflowError::Validation(err) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(err.code(), Some(ContractSuggestions::UNRESOLVED_KEY));
    }

    #[test]
    fn test_stage_order_reversed() {
        let config = PitchflowConfig {
            stage_order: Some(vec!["problem_statement".to_string(), "clarify_idea".to_string()]),
            ..PitchflowConfig::default()
        };

        let err = build_pipeline(&config).unwrap_err();
        let PitchflowError::Validation(err) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(err.code(), Some(ContractSuggestions::FORWARD_REF));
    }

    #[test]
    fn test_duplicate_in_stage_order() {
        let config = PitchflowConfig {
            stage_order: Some(vec!["clarify_idea".to_string(), "clarify_idea".to_string()]),
            ..PitchflowConfig::default()
        };

        let err = build_pipeline(&config).unwrap_err();
        let PitchflowError::Validation(err) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(err.code(), Some(ContractSuggestions::DUPLICATE_NAME));
    }

    #[test]
    fn test_unknown_stage_names() {
        let mut config = PitchflowConfig::default();
        config
            .stages
            .insert("swot".to_string(), StageOverride::default());

        let err = build_pipeline(&config).unwrap_err();
        let PitchflowError::Validation(err) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(err.code(), Some(ContractSuggestions::UNKNOWN_STAGE));
        assert_eq!(err.stages, vec!["swot".to_string()]);
    }
}

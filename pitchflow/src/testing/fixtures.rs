//! Pipeline fixtures.

use crate::context::INITIAL_INPUT_KEY;
use crate::pipeline::{Pipeline, PipelineBuilder, StageSpec};

/// The idea used in end-to-end scenarios.
pub const DOG_WALKER_IDEA: &str = "An app that matches dog walkers with busy pet owners";

/// A chain of `stages` stages where stage *i* writes `step_i` and reads the
/// previous stage's output.
///
/// # Panics
///
/// Panics if `stages` is zero.
#[must_use]
pub fn linear_pipeline(stages: usize) -> Pipeline {
    let specs = (1..=stages).map(|i| {
        let input = if i == 1 {
            INITIAL_INPUT_KEY.to_string()
        } else {
            format!("step_{}", i - 1)
        };
        StageSpec::new(format!("stage_{i}"), format!("Step {i} on {{{input}}}"), format!("step_{i}"))
    });

    PipelineBuilder::define("linear", specs).expect("linear pipeline is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_pipeline() {
        let pipeline = linear_pipeline(3);
        assert_eq!(pipeline.output_keys(), vec!["step_1", "step_2", "step_3"]);
        assert_eq!(
            pipeline.stage("stage_2").unwrap().referenced_keys(),
            vec!["step_1"]
        );
    }
}

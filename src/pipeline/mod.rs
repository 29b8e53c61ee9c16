// file: src/pipeline/mod.rs
// version: 1.0.0
// guid: 672439f4-a70c-496c-9a79-6de5b9687535

//! Planning of participant and group level analyses
//!
//! A plan is the ordered list of external commands for one run. It is built
//! from the dataset layout and the run configuration without side effects,
//! and handed to the executor afterwards.

pub mod group;
pub mod participant;

use crate::config::{AnalysisLevel, RunConfig};
use crate::executor::Invocation;
use crate::{bids::BidsLayout, freesurfer::commands, Result};
use std::path::{Path, PathBuf};

/// One external command of a plan
#[derive(Debug, Clone)]
pub struct Step {
    pub description: String,
    pub invocation: Invocation,
    /// Output of a previous run removed before the command starts
    pub stale_output: Option<PathBuf>,
    /// A failing best-effort step does not abort the run
    pub best_effort: bool,
}

impl Step {
    pub fn new(description: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            description: description.into(),
            invocation,
            stale_output: None,
            best_effort: false,
        }
    }

    /// Remove `dir` before running, if it exists
    pub fn clearing(mut self, dir: &Path) -> Self {
        self.stale_output = Some(dir.to_path_buf());
        self
    }

    /// Tolerate failure of this step
    pub fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }
}

/// Ordered steps of one run
#[derive(Debug, Clone, Default)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Invocations of one program, in plan order
    pub fn invocations_of<'a>(&'a self, program: &'a str) -> impl Iterator<Item = &'a Invocation> {
        self.steps
            .iter()
            .map(|s| &s.invocation)
            .filter(move |inv| inv.program == program)
    }
}

/// Build the plan for the configured analysis level
pub fn build_plan(config: &RunConfig, layout: &BidsLayout) -> Result<Plan> {
    let mut plan = Plan::default();

    if !config.skip_bids_validator {
        plan.push(Step::new(
            "BIDS validation",
            commands::bids_validator(layout.root()),
        ));
    }

    match config.analysis_level {
        AnalysisLevel::Participant => participant::plan_participants(config, layout, &mut plan)?,
        AnalysisLevel::Group => group::plan_group(config, layout, &mut plan)?,
    }

    Ok(plan)
}

/// Subjects selected by `--participant_label`, or every subject in the dataset
pub fn selected_subjects(config: &RunConfig, layout: &BidsLayout) -> Result<Vec<String>> {
    match &config.participant_labels {
        Some(labels) => Ok(labels.clone()),
        None => layout.subjects(),
    }
}

// file: src/utils/system.rs
// version: 1.0.0
// guid: 1efbcb02-fe70-42af-ac44-9b2f4763a9e7

//! System utility functions

use crate::pipeline::Plan;
use std::collections::BTreeSet;
use tracing::debug;

/// System utility functions
pub struct SystemUtils;

impl SystemUtils {
    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        which::which(command).is_ok()
    }

    /// Programs a plan needs that are not on PATH.
    ///
    /// Best-effort steps are ignored, they are allowed to fail anyway.
    pub fn missing_programs(plan: &Plan) -> Vec<String> {
        let required: BTreeSet<&str> = plan
            .steps()
            .iter()
            .filter(|s| !s.best_effort)
            .map(|s| s.invocation.program.as_str())
            .collect();

        required
            .into_iter()
            .filter(|program| {
                let found = Self::command_exists(program);
                debug!("{} {}", program, if found { "found" } else { "missing" });
                !found
            })
            .map(str::to_string)
            .collect()
    }
}

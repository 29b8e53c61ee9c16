// file: src/pipeline/group.rs
// version: 1.1.0
// guid: ad63742a-fdcf-47ab-823c-f69d9f2dce39

//! Group level: study specific template and registration to it

use super::{selected_subjects, Plan, Step};
use crate::bids::BidsLayout;
use crate::config::RunConfig;
use crate::freesurfer::{self, commands, Hemisphere};
use crate::Result;
use tracing::info;

pub const SKIP_MESSAGE: &str = "Only one subject included in the analysis. Skipping group level";

/// Add the template building and surface registration steps.
///
/// Needs the participant level output of every subject in the output
/// directory. With fewer than two subjects nothing is planned.
pub fn plan_group(config: &RunConfig, layout: &BidsLayout, plan: &mut Plan) -> Result<()> {
    let subjects = selected_subjects(config, layout)?;
    if subjects.len() <= 1 {
        // Printed as well as logged so `--quiet` cannot hide it
        println!("{}", SKIP_MESSAGE);
        info!("{}", SKIP_MESSAGE);
        return Ok(());
    }

    let template = &config.template_name;
    let fsids: Vec<String> = subjects.iter().map(|s| freesurfer::subject_id(s)).collect();

    plan.push(
        Step::new(
            format!("template {}", template),
            commands::make_average_subject(template, &fsids, &config.output_dir),
        )
        .clearing(&config.output_dir.join(template)),
    );

    for fsid in &fsids {
        for hemi in Hemisphere::BOTH {
            plan.push(Step::new(
                format!("register {} {}", fsid, hemi.as_str()),
                commands::mris_register(&config.output_dir, fsid, template, hemi),
            ));
        }
    }

    Ok(())
}

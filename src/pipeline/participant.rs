// file: src/pipeline/participant.rs
// version: 1.1.0
// guid: 5849c2af-9533-44cd-b9db-ca70be3bdbfa

//! Participant level: cross-sectional and longitudinal recon-all runs

use super::{selected_subjects, Plan, Step};
use crate::bids::BidsLayout;
use crate::config::RunConfig;
use crate::freesurfer::{self, commands, AnatInputs, TEMPLATE_ASSETS};
use crate::logging::logger::with_subject_span;
use crate::Result;
use tracing::{info, warn};

/// Add the participant level steps for every selected subject
pub fn plan_participants(config: &RunConfig, layout: &BidsLayout, plan: &mut Plan) -> Result<()> {
    plan_template_assets(config, plan);

    let longitudinal = layout.is_longitudinal(config.acquisition_label.as_deref())?;
    if longitudinal {
        info!("Dataset contains longitudinal T1w data");
    }

    for subject in selected_subjects(config, layout)? {
        if !layout.has_subject(&subject) {
            return Err(crate::error::BidsAppError::validation(format!(
                "Participant {} not found in {}",
                subject,
                layout.root().display()
            )));
        }

        with_subject_span(&subject, || {
            let sessions = layout.sessions(&subject)?;
            if sessions.is_empty() {
                plan_cross_sectional(config, layout, &subject, plan)
            } else {
                plan_sessions(config, layout, &subject, &sessions, longitudinal, plan)
            }
        })?;
    }

    Ok(())
}

/// Best-effort copies of fsaverage and the EC atlases into the output
/// directory, for the ones not already there
fn plan_template_assets(config: &RunConfig, plan: &mut Plan) {
    let Some(subjects_dir) = &config.subjects_dir else {
        warn!("SUBJECTS_DIR is not set, not seeding template assets");
        return;
    };

    for asset in TEMPLATE_ASSETS {
        let dest = config.output_dir.join(asset);
        if dest.exists() {
            continue;
        }
        plan.push(
            Step::new(
                format!("copy {}", asset),
                commands::copy_asset(&subjects_dir.join(asset), &dest),
            )
            .best_effort(),
        );
    }
}

/// Subject without session directories: one recon-all over all its T1w images
fn plan_cross_sectional(
    config: &RunConfig,
    layout: &BidsLayout,
    subject: &str,
    plan: &mut Plan,
) -> Result<()> {
    let inputs = AnatInputs {
        t1w: layout.t1w_images(subject, None, config.acquisition_label.as_deref())?,
        t2w: layout.t2w_images(subject, None)?,
    };
    if inputs.t1w.is_empty() {
        return Err(crate::error::BidsAppError::validation(format!(
            "No T1w images found for participant {}",
            subject
        )));
    }

    let fsid = freesurfer::subject_id(subject);
    plan.push(
        Step::new(
            format!("recon-all {}", fsid),
            commands::recon_all_cross(
                &fsid,
                &config.output_dir,
                &inputs,
                &config.stage_flags(),
                config.n_cpus,
            ),
        )
        .clearing(&config.output_dir.join(&fsid)),
    );

    Ok(())
}

/// Subject with sessions: one full recon-all per session, then the subject
/// template and the longitudinal runs when the study is longitudinal
fn plan_sessions(
    config: &RunConfig,
    layout: &BidsLayout,
    subject: &str,
    sessions: &[String],
    longitudinal: bool,
    plan: &mut Plan,
) -> Result<()> {
    let mut timepoints = Vec::new();

    for session in sessions {
        let inputs = AnatInputs {
            t1w: layout.t1w_images(subject, Some(session), config.acquisition_label.as_deref())?,
            t2w: layout.t2w_images(subject, Some(session))?,
        };
        if inputs.t1w.is_empty() {
            warn!("No T1w images in session {}, skipping it", session);
            continue;
        }

        let tp = freesurfer::timepoint_id(subject, session);
        plan.push(
            Step::new(
                format!("recon-all {}", tp),
                commands::recon_all_cross(
                    &tp,
                    &config.output_dir,
                    &inputs,
                    &["-all".to_string()],
                    config.n_cpus,
                ),
            )
            .clearing(&config.output_dir.join(&tp)),
        );
        timepoints.push(tp);
    }

    if timepoints.is_empty() {
        return Err(crate::error::BidsAppError::validation(format!(
            "No session of participant {} has T1w images",
            subject
        )));
    }

    if !longitudinal {
        return Ok(());
    }

    let base = freesurfer::subject_id(subject);
    let stage_flags = config.stage_flags();

    plan.push(
        Step::new(
            format!("recon-all base {}", base),
            commands::recon_all_base(
                &base,
                &config.output_dir,
                &timepoints,
                &stage_flags,
                config.n_cpus,
            ),
        )
        .clearing(&config.output_dir.join(&base)),
    );

    for tp in &timepoints {
        plan.push(
            Step::new(
                format!("recon-all long {}", tp),
                commands::recon_all_long(tp, &base, &config.output_dir, &stage_flags, config.n_cpus),
            )
            .clearing(&commands::recon_all_long_dir(&config.output_dir, tp, &base)),
        );
    }

    Ok(())
}

// file: src/config/mod.rs
// version: 1.0.0
// guid: fa5c8717-69d8-48f5-b716-a74a8ba026f1

//! Run configuration for the FreeSurfer BIDS app
//!
//! Holds the resolved settings for a single run and validates them before any
//! directory is scanned or command is issued.

pub mod loader;

use regex::Regex;
use std::path::PathBuf;

/// Level of the analysis to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisLevel {
    Participant,
    Group,
}

impl AnalysisLevel {
    /// Get the analysis level as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisLevel::Participant => "participant",
            AnalysisLevel::Group => "group",
        }
    }
}

impl std::str::FromStr for AnalysisLevel {
    type Err = crate::error::BidsAppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "participant" => Ok(AnalysisLevel::Participant),
            "group" => Ok(AnalysisLevel::Group),
            _ => Err(crate::error::BidsAppError::validation(format!(
                "Unknown analysis level: {}",
                s
            ))),
        }
    }
}

/// recon-all processing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Autorecon1,
    Autorecon2,
    Autorecon3,
    AutoreconAll,
}

impl Stage {
    /// Get the stage name as recon-all spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Autorecon1 => "autorecon1",
            Stage::Autorecon2 => "autorecon2",
            Stage::Autorecon3 => "autorecon3",
            Stage::AutoreconAll => "autorecon-all",
        }
    }

    /// The recon-all flag for this stage
    pub fn flag(&self) -> String {
        format!("-{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = crate::error::BidsAppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "autorecon1" => Ok(Stage::Autorecon1),
            "autorecon2" => Ok(Stage::Autorecon2),
            "autorecon3" => Ok(Stage::Autorecon3),
            "autorecon-all" => Ok(Stage::AutoreconAll),
            _ => Err(crate::error::BidsAppError::validation(format!(
                "Unknown stage: {}",
                s
            ))),
        }
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root of the BIDS dataset
    pub bids_dir: PathBuf,
    /// Absolute FreeSurfer subjects directory the results go to
    pub output_dir: PathBuf,
    pub analysis_level: AnalysisLevel,
    /// Selected participant labels, `None` means every subject in the dataset
    pub participant_labels: Option<Vec<String>>,
    pub n_cpus: u32,
    pub stages: Vec<Stage>,
    pub template_name: String,
    pub license_key: String,
    pub acquisition_label: Option<String>,
    /// FreeSurfer's own `SUBJECTS_DIR`, source of the template assets
    pub subjects_dir: Option<PathBuf>,
    pub skip_bids_validator: bool,
    pub dry_run: bool,
}

impl RunConfig {
    /// Validate the run configuration
    pub fn validate(&self) -> crate::Result<()> {
        if !self.bids_dir.is_dir() {
            return Err(crate::error::BidsAppError::validation(format!(
                "BIDS directory does not exist: {}",
                self.bids_dir.display()
            )));
        }

        if self.n_cpus == 0 {
            return Err(crate::error::BidsAppError::validation(
                "n_cpus must be at least 1",
            ));
        }

        if self.stages.is_empty() {
            return Err(crate::error::BidsAppError::validation(
                "At least one stage must be selected",
            ));
        }

        if self.license_key.trim().is_empty() {
            return Err(crate::error::BidsAppError::validation(
                "License key cannot be empty",
            ));
        }

        if self.template_name.is_empty()
            || self.template_name.contains('/')
            || self.template_name == "."
            || self.template_name == ".."
        {
            return Err(crate::error::BidsAppError::validation(format!(
                "Invalid template name: {:?}",
                self.template_name
            )));
        }

        if let Some(labels) = &self.participant_labels {
            if labels.is_empty() {
                return Err(crate::error::BidsAppError::validation(
                    "At least one participant label must be given",
                ));
            }
            for label in labels {
                validate_label("participant", label)?;
            }
        }

        if let Some(acq) = &self.acquisition_label {
            validate_label("acquisition", acq)?;
        }

        Ok(())
    }

    /// `-<stage>` flags in the order they were requested
    pub fn stage_flags(&self) -> Vec<String> {
        self.stages.iter().map(Stage::flag).collect()
    }
}

/// Strip an optional `sub-` prefix from a participant label
pub fn normalize_participant_label(label: &str) -> String {
    label.strip_prefix("sub-").unwrap_or(label).to_string()
}

/// Check that a label is a BIDS label (alphanumeric only)
pub fn validate_label(kind: &str, label: &str) -> crate::Result<()> {
    let re = Regex::new(r"^[a-zA-Z0-9]+$").map_err(|e| {
        crate::error::BidsAppError::config(format!("Invalid regex pattern: {}", e))
    })?;

    if !re.is_match(label) {
        return Err(crate::error::BidsAppError::validation(format!(
            "Invalid {} label {:?}: BIDS labels are alphanumeric",
            kind, label
        )));
    }

    Ok(())
}

// file: src/cli/args.rs
// version: 1.0.0
// guid: 565e7824-0fd5-440a-9973-12fd2c925e85

//! Command line argument definitions

use crate::config::{AnalysisLevel, Stage};
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "freesurfer-bids-app")]
#[command(about = "FreeSurfer recon-all + custom template generation.")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// The directory with the input dataset formatted according to the BIDS standard.
    pub bids_dir: String,

    /// The directory where the output files should be stored. If you are running
    /// group level analysis this folder should be prepopulated with the results of
    /// the participant level analysis.
    pub output_dir: String,

    /// Level of the analysis that will be performed. Multiple participant level
    /// analyses can be run independently (in parallel) using the same output_dir.
    #[arg(value_enum)]
    pub analysis_level: AnalysisLevelArg,

    /// The label of the participant that should be analyzed. The label corresponds
    /// to sub-<participant_label> from the BIDS spec (so it does not include "sub-").
    /// If this parameter is not provided all subjects are analyzed. Multiple
    /// participants can be specified with a space separated list.
    #[arg(long = "participant_label", num_args = 1..)]
    pub participant_label: Option<Vec<String>>,

    /// Number of CPUs/cores available to use.
    #[arg(long = "n_cpus", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub n_cpus: u32,

    /// Autorecon stages to run.
    #[arg(long, value_enum, num_args = 1.., default_values_t = vec![StageArg::AutoreconAll])]
    pub stages: Vec<StageArg>,

    /// Name for the custom group level template generated for this dataset
    #[arg(long = "template_name", default_value = "average")]
    pub template_name: String,

    /// FreeSurfer license key - letters and numbers after "*" in the email you
    /// received after registration. To register (for free) visit
    /// https://surfer.nmr.mgh.harvard.edu/registration.html
    #[arg(long = "license_key", required = true)]
    pub license_key: String,

    /// If the dataset contains multiple T1 weighted images from different
    /// acquisitions which one should be used? Corresponds to "acq-<acquisition_label>"
    #[arg(long = "acquisition_label")]
    pub acquisition_label: Option<String>,

    /// Do not run bids-validator before processing
    #[arg(long = "skip_bids_validator")]
    pub skip_bids_validator: bool,

    /// Print the commands that would run without running them
    #[arg(long = "dry_run")]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long)]
    pub quiet: bool,

    /// Print the version and exit
    // Never read after parsing: `version_requested` handles the flag on the
    // raw arguments before clap runs. The field lets clap accept and
    // document it.
    #[arg(short = 'v', long = "version", action = ArgAction::SetTrue)]
    pub version: bool,
}

/// Analysis level argument for CLI
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisLevelArg {
    Participant,
    Group,
}

impl From<AnalysisLevelArg> for AnalysisLevel {
    fn from(level: AnalysisLevelArg) -> Self {
        match level {
            AnalysisLevelArg::Participant => AnalysisLevel::Participant,
            AnalysisLevelArg::Group => AnalysisLevel::Group,
        }
    }
}

/// recon-all stage argument for CLI
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageArg {
    Autorecon1,
    Autorecon2,
    Autorecon3,
    AutoreconAll,
}

impl From<StageArg> for Stage {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Autorecon1 => Stage::Autorecon1,
            StageArg::Autorecon2 => Stage::Autorecon2,
            StageArg::Autorecon3 => Stage::Autorecon3,
            StageArg::AutoreconAll => Stage::AutoreconAll,
        }
    }
}

/// Whether `-v`/`--version` appears on the command line.
///
/// The version flag has to win over missing required arguments, so it is
/// checked on the raw arguments before clap parses them.
pub fn version_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .skip(1)
        .take_while(|a| a.as_ref() != "--")
        .any(|a| matches!(a.as_ref(), "-v" | "--version"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from([
            "freesurfer-bids-app",
            "/data",
            "/out",
            "participant",
            "--license_key",
            "ABC",
        ])
        .unwrap();

        assert_eq!(cli.analysis_level, AnalysisLevelArg::Participant);
        assert_eq!(cli.n_cpus, 1);
        assert_eq!(cli.stages, vec![StageArg::AutoreconAll]);
        assert_eq!(cli.template_name, "average");
        assert!(cli.participant_label.is_none());
        assert!(cli.acquisition_label.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_multiple_values() {
        let cli = Cli::try_parse_from([
            "freesurfer-bids-app",
            "/data",
            "/out",
            "group",
            "--participant_label",
            "01",
            "02",
            "--stages",
            "autorecon1",
            "autorecon2",
            "--n_cpus",
            "4",
            "--license_key",
            "ABC",
        ])
        .unwrap();

        assert_eq!(
            cli.participant_label,
            Some(vec!["01".to_string(), "02".to_string()])
        );
        assert_eq!(cli.stages, vec![StageArg::Autorecon1, StageArg::Autorecon2]);
        assert_eq!(cli.n_cpus, 4);
        assert_eq!(AnalysisLevel::from(cli.analysis_level), AnalysisLevel::Group);
    }

    #[test]
    fn test_version_flag_is_accepted_with_other_arguments() {
        let cli = Cli::try_parse_from([
            "freesurfer-bids-app",
            "/data",
            "/out",
            "participant",
            "--license_key",
            "ABC",
            "-v",
        ])
        .unwrap();
        assert!(cli.version);
    }

    #[test]
    fn test_license_key_required() {
        let result = Cli::try_parse_from(["freesurfer-bids-app", "/data", "/out", "participant"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_cpus() {
        let result = Cli::try_parse_from([
            "freesurfer-bids-app",
            "/data",
            "/out",
            "participant",
            "--license_key",
            "ABC",
            "--n_cpus",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_level() {
        let result = Cli::try_parse_from([
            "freesurfer-bids-app",
            "/data",
            "/out",
            "session",
            "--license_key",
            "ABC",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_version_requested() {
        assert!(version_requested(["app", "-v"]));
        assert!(version_requested(["app", "/data", "--version"]));
        assert!(!version_requested(["app", "/data", "/out", "group"]));
        assert!(!version_requested(["app", "--", "-v"]));
        // program name is never treated as a flag
        assert!(!version_requested(["-v"]));
    }
}

// file: src/config/loader.rs
// version: 1.0.0
// guid: 14051c10-4e0f-4e7a-9f34-73c8355ef59e

//! Builds a `RunConfig` from command line arguments and the environment

use super::{normalize_participant_label, RunConfig};
use crate::cli::args::Cli;
use crate::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the version file inside the app container
pub const DEFAULT_VERSION_FILE: &str = "/version";

/// Environment variable overriding the version file location
pub const VERSION_FILE_ENV: &str = "BIDS_APP_VERSION_FILE";

/// Configuration loader backed by a snapshot of the environment
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Set environment variable for testing
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }

    /// Remove environment variable for testing
    pub fn remove_env_var(&mut self, key: &str) {
        self.env_vars.remove(key);
    }

    /// FreeSurfer's `SUBJECTS_DIR`, if set and non-empty
    pub fn subjects_dir(&self) -> Option<PathBuf> {
        self.env_vars
            .get("SUBJECTS_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    /// Resolve and validate the run configuration for the parsed CLI
    pub fn load_run_config(&self, cli: &Cli) -> Result<RunConfig> {
        let output_dir = absolute_path(Path::new(&cli.output_dir))?;
        debug!("Output directory resolved to {}", output_dir.display());

        let config = RunConfig {
            bids_dir: PathBuf::from(&cli.bids_dir),
            output_dir,
            analysis_level: cli.analysis_level.into(),
            participant_labels: cli.participant_label.as_ref().map(|labels| {
                labels
                    .iter()
                    .map(|l| normalize_participant_label(l))
                    .collect()
            }),
            n_cpus: cli.n_cpus,
            stages: cli.stages.iter().map(|s| (*s).into()).collect(),
            template_name: cli.template_name.clone(),
            license_key: cli.license_key.clone(),
            acquisition_label: cli.acquisition_label.clone(),
            subjects_dir: self.subjects_dir(),
            skip_bids_validator: cli.skip_bids_validator,
            dry_run: cli.dry_run,
        };

        config.validate()?;

        Ok(config)
    }

    /// Path of the version file, honouring the override variable
    pub fn version_file(&self) -> PathBuf {
        self.env_vars
            .get(VERSION_FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VERSION_FILE))
    }

    /// Version string shown by `--version`
    pub fn version(&self) -> String {
        match fs::read_to_string(self.version_file()) {
            Ok(content) => content.trim_end().to_string(),
            Err(e) => {
                debug!("Version file unavailable ({}), using crate version", e);
                crate::VERSION.to_string()
            }
        }
    }
}

/// Make `path` absolute against the current directory.
///
/// recon-all resolves `-sd` relative to its own working directory, so the
/// output directory is always passed as an absolute path.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_load_run_config() -> Result<()> {
        let bids = TempDir::new().unwrap();
        let bids_path = bids.path().to_str().unwrap();
        let cli = parse(&[
            "app",
            bids_path,
            "out",
            "participant",
            "--participant_label",
            "sub-01",
            "02",
            "--license_key",
            "KEY",
            "--acquisition_label",
            "mprage",
        ]);

        let mut loader = ConfigLoader::new();
        loader.set_env_var("SUBJECTS_DIR".to_string(), "/opt/freesurfer/subjects".to_string());
        let config = loader.load_run_config(&cli)?;

        assert!(config.output_dir.is_absolute());
        assert!(config.output_dir.ends_with("out"));
        assert_eq!(
            config.participant_labels,
            Some(vec!["01".to_string(), "02".to_string()])
        );
        assert_eq!(config.acquisition_label.as_deref(), Some("mprage"));
        assert_eq!(
            config.subjects_dir,
            Some(PathBuf::from("/opt/freesurfer/subjects"))
        );

        Ok(())
    }

    #[test]
    fn test_missing_subjects_dir() {
        let mut loader = ConfigLoader::new();
        loader.remove_env_var("SUBJECTS_DIR");
        assert!(loader.subjects_dir().is_none());

        loader.set_env_var("SUBJECTS_DIR".to_string(), String::new());
        assert!(loader.subjects_dir().is_none());
    }

    #[test]
    fn test_invalid_label_rejected() {
        let bids = TempDir::new().unwrap();
        let cli = parse(&[
            "app",
            bids.path().to_str().unwrap(),
            "/out",
            "participant",
            "--participant_label",
            "01*",
            "--license_key",
            "KEY",
        ]);

        let loader = ConfigLoader::new();
        assert!(loader.load_run_config(&cli).is_err());
    }

    #[test]
    fn test_version_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "v7.4.1-2").unwrap();

        let mut loader = ConfigLoader::new();
        loader.set_env_var(
            VERSION_FILE_ENV.to_string(),
            file.path().to_string_lossy().to_string(),
        );
        assert_eq!(loader.version(), "v7.4.1-2");
    }

    #[test]
    fn test_version_fallback() {
        let mut loader = ConfigLoader::new();
        loader.set_env_var(
            VERSION_FILE_ENV.to_string(),
            "/definitely/not/here/version".to_string(),
        );
        assert_eq!(loader.version(), crate::VERSION);
    }

    #[test]
    fn test_absolute_path() -> Result<()> {
        assert_eq!(absolute_path(Path::new("/data/out"))?, PathBuf::from("/data/out"));
        let rel = absolute_path(Path::new("derivatives"))?;
        assert!(rel.is_absolute());
        assert!(rel.ends_with("derivatives"));
        Ok(())
    }
}

// file: src/bids/layout.rs
// version: 1.1.0
// guid: e7ae7e2a-9aa0-44d8-9cd6-c9ae17fa3ed9

//! Subject, session and anatomical image discovery in a BIDS dataset

use crate::Result;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SUBJECT_PREFIX: &str = "sub-";
const SESSION_PREFIX: &str = "ses-";

/// Read-only view of a BIDS dataset on disk
#[derive(Debug, Clone)]
pub struct BidsLayout {
    root: PathBuf,
}

impl BidsLayout {
    /// Open a dataset rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(crate::error::BidsAppError::validation(format!(
                "BIDS directory does not exist: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a subject, `<root>/sub-<label>`
    pub fn subject_dir(&self, subject: &str) -> PathBuf {
        self.root.join(format!("{}{}", SUBJECT_PREFIX, subject))
    }

    /// Whether `sub-<label>` exists in the dataset
    pub fn has_subject(&self, subject: &str) -> bool {
        self.subject_dir(subject).is_dir()
    }

    /// Labels of every `sub-*` directory, sorted
    pub fn subjects(&self) -> Result<Vec<String>> {
        labels_in(&self.root, SUBJECT_PREFIX)
    }

    /// Labels of every `ses-*` directory of a subject, sorted
    pub fn sessions(&self, subject: &str) -> Result<Vec<String>> {
        labels_in(&self.subject_dir(subject), SESSION_PREFIX)
    }

    /// Whether any subject has session directories
    pub fn has_sessions(&self) -> Result<bool> {
        for subject in self.subjects()? {
            if !self.sessions(&subject)?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// T1w images of a subject (or one of its sessions), optionally
    /// restricted to an acquisition label
    pub fn t1w_images(
        &self,
        subject: &str,
        session: Option<&str>,
        acquisition: Option<&str>,
    ) -> Result<Vec<PathBuf>> {
        let name = match acquisition {
            Some(acq) => format!("*acq-{}*_T1w.nii*", acq),
            None => "*_T1w.nii*".to_string(),
        };
        entries(&self.anat_dir(subject, session), &name, EntryKind::File)
    }

    /// T2w images of a subject (or one of its sessions)
    pub fn t2w_images(&self, subject: &str, session: Option<&str>) -> Result<Vec<PathBuf>> {
        entries(&self.anat_dir(subject, session), "*_T2w.nii*", EntryKind::File)
    }

    /// Whether at least one subject has more than one session holding a
    /// usable T1w image.
    ///
    /// Only then are the subject template and longitudinal runs issued. The
    /// check covers the whole dataset, independent of which participants are
    /// being processed.
    pub fn is_longitudinal(&self, acquisition: Option<&str>) -> Result<bool> {
        if !self.has_sessions()? {
            return Ok(false);
        }

        for subject in self.subjects()? {
            let mut valid_sessions = 0;
            for session in self.sessions(&subject)? {
                if !self.t1w_images(&subject, Some(&session), acquisition)?.is_empty() {
                    valid_sessions += 1;
                }
            }
            if valid_sessions > 1 {
                debug!(
                    "Subject {} has {} sessions with T1w data, study is longitudinal",
                    subject, valid_sessions
                );
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn anat_dir(&self, subject: &str, session: Option<&str>) -> PathBuf {
        let mut dir = self.subject_dir(subject);
        if let Some(ses) = session {
            dir = dir.join(format!("{}{}", SESSION_PREFIX, ses));
        }
        dir.join("anat")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

/// Entries of `dir` whose name matches `pattern`, sorted.
///
/// Names are matched lossily so that files whose names are not valid UTF-8
/// are still found; the returned paths keep the exact on-disk names. A
/// missing `dir` has no entries.
fn entries(dir: &Path, pattern: &str, kind: EntryKind) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = Pattern::new(pattern)?;
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name() else {
            continue;
        };
        if !pattern.matches(&name.to_string_lossy()) {
            continue;
        }
        let wanted = match kind {
            EntryKind::File => path.is_file(),
            EntryKind::Directory => path.is_dir(),
        };
        if wanted {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Labels of the `<prefix><label>` directories in `dir`
fn labels_in(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    Ok(entries(dir, &format!("{}*", prefix), EntryKind::Directory)?
        .iter()
        .filter_map(|p| p.file_name())
        .filter_map(|name| name.to_str())
        .filter_map(|name| name.strip_prefix(prefix))
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect())
}

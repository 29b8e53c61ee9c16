// file: src/freesurfer/mod.rs
// version: 1.0.0
// guid: e845d8c4-7821-410f-a4c1-784d503853a8

//! FreeSurfer naming conventions and command construction

pub mod commands;

pub use commands::AnatInputs;

/// Template assets seeded from FreeSurfer's own `SUBJECTS_DIR`
pub const TEMPLATE_ASSETS: [&str; 3] = ["fsaverage", "lh.EC_average", "rh.EC_average"];

/// Cortical hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hemisphere::Left => "lh",
            Hemisphere::Right => "rh",
        }
    }
}

/// FreeSurfer subject ID of a subject, `sub-<label>`
pub fn subject_id(subject: &str) -> String {
    format!("sub-{}", subject)
}

/// FreeSurfer subject ID of one session, `sub-<label>_ses-<label>`
pub fn timepoint_id(subject: &str, session: &str) -> String {
    format!("sub-{}_ses-{}", subject, session)
}

/// Directory name recon-all -long writes, `<timepoint>.long.<base>`
pub fn long_id(timepoint: &str, base: &str) -> String {
    format!("{}.long.{}", timepoint, base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        assert_eq!(subject_id("A"), "sub-A");
        assert_eq!(timepoint_id("A", "01"), "sub-A_ses-01");
        assert_eq!(long_id("sub-A_ses-01", "sub-A"), "sub-A_ses-01.long.sub-A");
    }

    #[test]
    fn test_hemisphere_order() {
        let names: Vec<&str> = Hemisphere::BOTH.iter().map(Hemisphere::as_str).collect();
        assert_eq!(names, vec!["lh", "rh"]);
    }
}

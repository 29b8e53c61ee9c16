// file: src/freesurfer/commands.rs
// version: 1.1.0
// guid: 4adae8da-2b18-498c-b5f6-47398c98eece

//! Invocations of the FreeSurfer and BIDS tools

use super::{long_id, Hemisphere};
use crate::executor::Invocation;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Anatomical inputs of one cross-sectional recon-all run
#[derive(Debug, Clone, Default)]
pub struct AnatInputs {
    pub t1w: Vec<PathBuf>,
    pub t2w: Vec<PathBuf>,
}

impl AnatInputs {
    /// `-i <t1>...` followed by `-T2 <t2>... -T2pial` when T2w images exist
    fn args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        for t1 in &self.t1w {
            args.push(OsString::from("-i"));
            args.push(t1.into());
        }
        if !self.t2w.is_empty() {
            for t2 in &self.t2w {
                args.push(OsString::from("-T2"));
                args.push(t2.into());
            }
            args.push(OsString::from("-T2pial"));
        }
        args
    }
}

/// `bids-validator <bids_dir>`
pub fn bids_validator(bids_dir: &Path) -> Invocation {
    Invocation::new("bids-validator").arg(bids_dir)
}

/// `cp -rf <src> <dest>`
pub fn copy_asset(src: &Path, dest: &Path) -> Invocation {
    Invocation::new("cp")
        .arg("-rf")
        .arg(src)
        .arg(dest)
}

/// `recon-all -subjid <fsid> -sd <out> <inputs> <stages> -openmp <n>`
pub fn recon_all_cross(
    fsid: &str,
    subjects_dir: &Path,
    inputs: &AnatInputs,
    stage_flags: &[String],
    n_cpus: u32,
) -> Invocation {
    Invocation::new("recon-all")
        .arg("-subjid")
        .arg(fsid)
        .arg("-sd")
        .arg(subjects_dir)
        .args(inputs.args())
        .args(stage_flags.iter().cloned())
        .arg("-openmp")
        .arg(n_cpus.to_string())
}

/// `recon-all -base <base> -sd <out> -tp <tp>... <stages> -openmp <n>`
pub fn recon_all_base(
    base: &str,
    subjects_dir: &Path,
    timepoints: &[String],
    stage_flags: &[String],
    n_cpus: u32,
) -> Invocation {
    let tp_args = timepoints
        .iter()
        .flat_map(|tp| ["-tp".to_string(), tp.clone()]);

    Invocation::new("recon-all")
        .arg("-base")
        .arg(base)
        .arg("-sd")
        .arg(subjects_dir)
        .args(tp_args)
        .args(stage_flags.iter().cloned())
        .arg("-openmp")
        .arg(n_cpus.to_string())
}

/// `recon-all -long <tp> <base> -sd <out> <stages> -openmp <n>`
pub fn recon_all_long(
    timepoint: &str,
    base: &str,
    subjects_dir: &Path,
    stage_flags: &[String],
    n_cpus: u32,
) -> Invocation {
    Invocation::new("recon-all")
        .arg("-long")
        .arg(timepoint)
        .arg(base)
        .arg("-sd")
        .arg(subjects_dir)
        .args(stage_flags.iter().cloned())
        .arg("-openmp")
        .arg(n_cpus.to_string())
}

/// Output directory written by `recon_all_long`
pub fn recon_all_long_dir(subjects_dir: &Path, timepoint: &str, base: &str) -> PathBuf {
    subjects_dir.join(long_id(timepoint, base))
}

/// `make_average_subject --no-symlink --out <template> --subjects <fsid>...`
pub fn make_average_subject(template: &str, fsids: &[String], subjects_dir: &Path) -> Invocation {
    Invocation::new("make_average_subject")
        .arg("--no-symlink")
        .arg("--out")
        .arg(template)
        .arg("--subjects")
        .args(fsids.iter().cloned())
        .env("SUBJECTS_DIR", subjects_dir)
}

/// `mris_register -curv <sphere> <template tif> <sphere.reg.template>`
pub fn mris_register(
    subjects_dir: &Path,
    fsid: &str,
    template: &str,
    hemi: Hemisphere,
) -> Invocation {
    let surf = subjects_dir.join(fsid).join("surf");
    let sphere = surf.join(format!("{}.sphere", hemi.as_str()));
    let tif = subjects_dir
        .join(template)
        .join(format!("{}.reg.template.tif", hemi.as_str()));
    let reg = surf.join(format!("{}.sphere.reg.{}", hemi.as_str(), template));

    Invocation::new("mris_register")
        .arg("-curv")
        .arg(&sphere)
        .arg(&tif)
        .arg(&reg)
        .env("SUBJECTS_DIR", subjects_dir)
}

// file: src/executor.rs
// version: 1.1.0
// guid: 0f4b3de8-d92d-4c2a-85b2-48edade025a3

//! Sequential execution of planned external commands

use crate::error::{BidsAppError, Result};
use crate::pipeline::Plan;
use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Environment variable removed from every child; it makes FreeSurfer
/// write gigabytes of debug files
pub const STRIPPED_ENV_VAR: &str = "DEBUG";

/// One external program invocation.
///
/// Arguments and environment values are kept as `OsString` so that paths
/// reach the child exactly as they are on disk, even when not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<OsString>,
    /// Variables set on top of the inherited environment
    pub env: Vec<(String, OsString)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs invocations and removes stale output directories
#[async_trait]
pub trait CommandRunner: Send {
    /// Run one invocation to completion; a non-zero exit is an error
    async fn run(&mut self, invocation: &Invocation) -> Result<()>;

    /// Remove a directory tree left over from an earlier run
    async fn clear_directory(&mut self, path: &Path) -> Result<()>;
}

/// Runs programs as child processes, forwarding their output to stdout
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&mut self, invocation: &Invocation) -> Result<()> {
        if which::which(&invocation.program).is_err() {
            return Err(BidsAppError::CommandNotFound(invocation.program.clone()));
        }

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }
        cmd.env_remove(STRIPPED_ENV_VAR);

        let mut child = cmd.spawn().map_err(|e| {
            BidsAppError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to start {}: {}", invocation.program, e),
            ))
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (out, err, status) =
            tokio::join!(forward_lines(stdout), forward_lines(stderr), child.wait());
        out?;
        err?;
        let status = status?;

        if !status.success() {
            return Err(BidsAppError::process(invocation.to_string(), status.code()));
        }

        debug!("{} exited successfully", invocation.program);
        Ok(())
    }

    async fn clear_directory(&mut self, path: &Path) -> Result<()> {
        tokio::fs::remove_dir_all(path).await?;
        Ok(())
    }
}

/// Copy a child's output stream to stdout line by line as it arrives
async fn forward_lines<R>(reader: Option<R>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(());
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        println!("{}", line.trim_end_matches(&['\n', '\r'][..]));
    }
    Ok(())
}

/// Prints what would happen without touching anything
#[derive(Debug, Default)]
pub struct DryRunRunner;

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&mut self, invocation: &Invocation) -> Result<()> {
        let env: Vec<String> = invocation
            .env
            .iter()
            .map(|(k, v)| format!("{}={} ", k, v.to_string_lossy()))
            .collect();
        println!("DRY RUN: Would execute: {}{}", env.concat(), invocation);
        Ok(())
    }

    async fn clear_directory(&mut self, path: &Path) -> Result<()> {
        println!("DRY RUN: Would remove: {}", path.display());
        Ok(())
    }
}

/// Runs a plan step by step, stopping at the first fatal failure
pub struct Executor<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> Executor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Execute every step of the plan in order
    pub async fn execute(&mut self, plan: &Plan) -> Result<()> {
        let total = plan.len();

        for (index, step) in plan.steps().iter().enumerate() {
            debug!("Step {}/{}: {}", index + 1, total, step.description);

            if let Some(dir) = &step.stale_output {
                if dir.exists() {
                    info!("Removing previous output {}", dir.display());
                    self.runner.clear_directory(dir).await?;
                }
            }

            info!("{}", step.invocation);
            match self.runner.run(&step.invocation).await {
                Ok(()) => {}
                Err(e) if step.best_effort => {
                    warn!("Ignoring failure of {}: {}", step.description, e);
                }
                Err(e) => {
                    error!("{} failed: {}", step.description, e);
                    return Err(e);
                }
            }
        }

        info!("Finished {} steps", total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Step;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Records calls and fails the programs it is told to fail
    #[derive(Default)]
    struct RecordingRunner {
        calls: Vec<String>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&mut self, invocation: &Invocation) -> Result<()> {
            self.calls.push(invocation.to_string());
            if self.failing.contains(&invocation.program) {
                return Err(BidsAppError::process(invocation.to_string(), Some(1)));
            }
            Ok(())
        }

        async fn clear_directory(&mut self, path: &Path) -> Result<()> {
            self.calls.push(format!("rm {}", path.display()));
            Ok(())
        }
    }

    fn step(program: &str) -> Step {
        Step::new(program, Invocation::new(program))
    }

    #[test]
    fn test_display_quotes_whitespace() {
        let inv = Invocation::new("recon-all")
            .arg("-i")
            .arg("/data/my study/sub-01_T1w.nii");
        assert_eq!(inv.to_string(), "recon-all -i '/data/my study/sub-01_T1w.nii'");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_passes_non_utf8_arguments() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"sub-A_acq-\xffx_T1w.nii.gz");
        std::fs::write(dir.path().join(name), b"").unwrap();

        let mut runner = ProcessRunner::new();
        let inv = Invocation::new("test").arg("-f").arg(dir.path().join(name));
        assert!(runner.run(&inv).await.is_ok());
        assert!(inv.to_string().contains("sub-A_acq-\u{fffd}x_T1w.nii.gz"));
    }

    #[tokio::test]
    async fn test_best_effort_failure_continues() {
        let mut plan = Plan::default();
        plan.push(step("cp").best_effort());
        plan.push(step("recon-all"));

        let runner = RecordingRunner {
            failing: vec!["cp".to_string()],
            ..Default::default()
        };
        let mut executor = Executor::new(runner);

        assert!(executor.execute(&plan).await.is_ok());
        assert_eq!(executor.runner().calls, vec!["cp", "recon-all"]);
    }

    #[tokio::test]
    async fn test_fatal_failure_stops_plan() {
        let mut plan = Plan::default();
        plan.push(step("bids-validator"));
        plan.push(step("recon-all"));

        let runner = RecordingRunner {
            failing: vec!["bids-validator".to_string()],
            ..Default::default()
        };
        let mut executor = Executor::new(runner);

        let err = executor.execute(&plan).await.unwrap_err();
        assert!(matches!(err, BidsAppError::Process { .. }));
        assert_eq!(executor.runner().calls, vec!["bids-validator"]);
    }

    #[tokio::test]
    async fn test_stale_output_cleared_only_when_present() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("sub-01");
        std::fs::create_dir_all(&present).unwrap();
        let absent: PathBuf = dir.path().join("sub-02");

        let mut plan = Plan::default();
        plan.push(step("recon-all").clearing(&present));
        plan.push(step("recon-all").clearing(&absent));

        let mut executor = Executor::new(RecordingRunner::default());
        executor.execute(&plan).await.unwrap();

        assert_eq!(
            executor.runner().calls,
            vec![
                format!("rm {}", present.display()),
                "recon-all".to_string(),
                "recon-all".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_dry_run_leaves_directories() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("sub-01");
        std::fs::create_dir_all(&stale).unwrap();

        let mut plan = Plan::default();
        plan.push(step("recon-all").clearing(&stale));

        let mut executor = Executor::new(DryRunRunner);
        executor.execute(&plan).await.unwrap();
        assert!(stale.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_exit_codes() {
        let mut runner = ProcessRunner::new();
        assert!(runner.run(&Invocation::new("true")).await.is_ok());

        let err = runner
            .run(&Invocation::new("sh").arg("-c").arg("echo failing; exit 3"))
            .await
            .unwrap_err();
        match err {
            BidsAppError::Process { exit_code, .. } => assert_eq!(exit_code, Some(3)),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_strips_debug() {
        let mut runner = ProcessRunner::new();
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("test -z \"$DEBUG\" && test \"$SUBJECTS_DIR\" = /out")
            .env("DEBUG", "1")
            .env("SUBJECTS_DIR", "/out");
        assert!(runner.run(&inv).await.is_ok());
    }

    #[tokio::test]
    async fn test_process_runner_missing_program() {
        let mut runner = ProcessRunner::new();
        let err = runner
            .run(&Invocation::new("definitely-not-a-freesurfer-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, BidsAppError::CommandNotFound(_)));
    }

    #[tokio::test]
    async fn test_process_runner_clears_directory() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("fsaverage/surf");
        std::fs::create_dir_all(&stale).unwrap();

        let mut runner = ProcessRunner::new();
        runner
            .clear_directory(&dir.path().join("fsaverage"))
            .await
            .unwrap();
        assert!(!dir.path().join("fsaverage").exists());
    }
}

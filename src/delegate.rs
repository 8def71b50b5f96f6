//! Adapters for the two external collaborators: the linting engine and
//! the configuration wizard.
//!
//! Both run as separate executables. The adapters forward the invocation
//! as-is and relay whatever the collaborator reports; they never look at
//! what the engine found or how the wizard went about its work.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use crate::config::LauncherConfig;
use crate::diagnostics::{self, DEBUG_ENV};
use crate::error::LaunchError;
use crate::flags::{INIT_FLAG, InvocationContext};
use crate::input;

pub trait LintEngine {
    /// Runs the engine and returns its exit status unmodified.
    ///
    /// # Errors
    /// Returns an error if the engine could not be run to completion.
    fn execute(&self, ctx: &InvocationContext, piped: Option<&str>) -> Result<i32>;
}

#[async_trait]
pub trait ConfigInitializer {
    /// Resolves once the wizard has finished.
    ///
    /// # Errors
    /// Returns an error if the wizard could not be started or did not succeed.
    async fn initialize(&self) -> Result<()>;
}

/// What the dispatcher needs, handed out on demand so that nothing is
/// constructed before the invocation mode asks for it.
pub trait Collaborators {
    /// # Errors
    /// Returns an error if the input channel cannot be read.
    fn read_input(&self) -> Result<String>;

    /// # Errors
    /// Returns an error if the engine cannot be prepared.
    fn engine(&self) -> Result<Box<dyn LintEngine + '_>>;

    /// # Errors
    /// Returns an error if the wizard cannot be prepared.
    fn initializer(&self) -> Result<Box<dyn ConfigInitializer + '_>>;
}

/// Collaborators as installed next to the launcher.
pub struct Installed {
    config: LauncherConfig,
}

impl Installed {
    pub fn new(config: LauncherConfig) -> Self {
        Installed { config }
    }
}

impl Collaborators for Installed {
    fn read_input(&self) -> Result<String> {
        input::read_stdin()
    }

    fn engine(&self) -> Result<Box<dyn LintEngine + '_>> {
        Ok(Box::new(ProcessEngine::new(&self.config.engine)))
    }

    fn initializer(&self) -> Result<Box<dyn ConfigInitializer + '_>> {
        Ok(Box::new(ProcessInitializer::new(&self.config.initializer)))
    }
}

pub struct ProcessEngine {
    program: PathBuf,
    debug_filter: Option<&'static str>,
}

impl ProcessEngine {
    pub fn new(program: &Path) -> Self {
        tracing::debug!(target: "lintel::delegate", program = %program.display(), "loading linting engine");
        ProcessEngine {
            program: program.to_path_buf(),
            debug_filter: diagnostics::child_filter(),
        }
    }
}

impl LintEngine for ProcessEngine {
    fn execute(&self, ctx: &InvocationContext, piped: Option<&str>) -> Result<i32> {
        let mut cmd = Command::new(&self.program);
        cmd.args(ctx.forwarded_args());
        cmd.stdin(if piped.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        if let Some(filter) = self.debug_filter {
            cmd.env(DEBUG_ENV, filter);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LaunchError::EngineNotFound {
                    program: self.program.clone(),
                }
                .into());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("spawn linting engine: {}", self.program.display()));
            }
        };
        tracing::debug!(target: "lintel::delegate", pid = child.id(), piped = piped.is_some(), "engine started");

        if let (Some(text), Some(mut stdin)) = (piped, child.stdin.take()) {
            match stdin.write_all(text.as_bytes()) {
                // The engine may exit without consuming its input.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                other => other.context("write piped input to linting engine")?,
            }
        }

        let status = child.wait().context("wait for linting engine")?;
        tracing::debug!(target: "lintel::delegate", %status, "engine finished");
        match status.code() {
            Some(code) => Ok(code),
            None => Err(LaunchError::EngineTerminated {
                program: self.program.clone(),
                signal: signal_of(status),
            }
            .into()),
        }
    }
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}

pub struct ProcessInitializer {
    program: PathBuf,
    debug_filter: Option<&'static str>,
}

impl ProcessInitializer {
    pub fn new(program: &Path) -> Self {
        tracing::debug!(target: "lintel::delegate", program = %program.display(), "loading configuration wizard");
        ProcessInitializer {
            program: program.to_path_buf(),
            debug_filter: diagnostics::child_filter(),
        }
    }
}

#[async_trait]
impl ConfigInitializer for ProcessInitializer {
    async fn initialize(&self) -> Result<()> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.arg(INIT_FLAG);
        if let Some(filter) = self.debug_filter {
            cmd.env(DEBUG_ENV, filter);
        }
        let status = cmd
            .status()
            .await
            .with_context(|| format!("start configuration wizard: {}", self.program.display()))?;
        if !status.success() {
            bail!("configuration wizard exited with {status}");
        }
        Ok(())
    }
}

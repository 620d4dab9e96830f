//! Execution of the external `git` tool.

use std::process::Command;

use crate::error::ProcessError;

/// Runs git with an argument vector and returns its stdout.
///
/// The single seam between the resolver and the outside world; tests swap
/// in a scripted implementation instead of a real remote.
pub trait GitExec: Send + Sync {
    fn run(&self, args: &[&str]) -> Result<String, ProcessError>;
}

/// Spawns the `git` binary found on `PATH`.
#[derive(Debug, Default, Clone)]
pub struct SystemGit;

impl GitExec for SystemGit {
    fn run(&self, args: &[&str]) -> Result<String, ProcessError> {
        let output = Command::new("git").args(args).output().map_err(|err| {
            ProcessError {
                args: args.iter().map(|a| a.to_string()).collect(),
                status: None,
                stderr: err.to_string(),
            }
        })?;
        if !output.status.success() {
            return Err(ProcessError {
                args: args.iter().map(|a| a.to_string()).collect(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

//! Scripted git executor for tests.

use std::sync::Mutex;

use crate::error::ProcessError;
use crate::git::exec::GitExec;

/// Replays canned responses and records every invocation.
pub(crate) struct ScriptedGit {
    responses: Mutex<Vec<Result<String, ProcessError>>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedGit {
    pub(crate) fn returning(stdout: &str) -> ScriptedGit {
        ScriptedGit::with_responses(vec![Ok(stdout.to_string())])
    }

    pub(crate) fn failing() -> ScriptedGit {
        ScriptedGit::with_responses(vec![Err(ProcessError {
            args: Vec::new(),
            status: Some(128),
            stderr: "fatal: repository not found".to_string(),
        })])
    }

    pub(crate) fn with_responses(responses: Vec<Result<String, ProcessError>>) -> ScriptedGit {
        ScriptedGit {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl GitExec for ScriptedGit {
    fn run(&self, args: &[&str]) -> Result<String, ProcessError> {
        self.calls
            .lock()
            .unwrap()
            .push(args.iter().map(|a| a.to_string()).collect());
        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Ok(String::new()),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

/// Formats `(ref name, commit)` pairs the way `ls-remote` prints them.
pub(crate) fn ref_lines(entries: &[(&str, &str)]) -> String {
    entries
        .iter()
        .map(|(name, commit)| format!("{commit}\t{name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

//! Process control capability and its `tasklist`/`taskkill` implementation.

use std::process::{Command, Output};

use tracing::debug;

use crate::error::{ProcessError, ProcessResult};

const TASKLIST: &str = "tasklist";
const TASKKILL: &str = "taskkill";

/// Capability for finding and force-terminating processes by image name.
pub trait ProcessController {
    /// Whether at least one process with this image name is running.
    ///
    /// # Errors
    ///
    /// Returns an error when the process table cannot be queried.
    fn is_running(&self, image: &str) -> ProcessResult<bool>;

    /// Force-terminate every process with this image name.
    ///
    /// # Errors
    ///
    /// Returns an error when the termination request fails.
    fn terminate(&self, image: &str) -> ProcessResult<()>;
}

impl<T: ProcessController + ?Sized> ProcessController for &T {
    fn is_running(&self, image: &str) -> ProcessResult<bool> {
        (**self).is_running(image)
    }

    fn terminate(&self, image: &str) -> ProcessResult<()> {
        (**self).terminate(image)
    }
}

/// Windows process control via the stock `tasklist` and `taskkill` tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListController {
    list_program: &'static str,
    kill_program: &'static str,
}

impl Default for TaskListController {
    fn default() -> Self {
        Self {
            list_program: TASKLIST,
            kill_program: TASKKILL,
        }
    }
}

impl TaskListController {
    /// Controller using the system `tasklist` and `taskkill`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller invoking alternative helper programs with the same CLI.
    #[must_use]
    pub const fn with_programs(list_program: &'static str, kill_program: &'static str) -> Self {
        Self {
            list_program,
            kill_program,
        }
    }

    fn spawn(program: &'static str, image: &str, args: &[&str]) -> ProcessResult<Output> {
        Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ProcessError::Spawn {
                program,
                image: image.to_string(),
                source,
            })
    }
}

impl ProcessController for TaskListController {
    fn is_running(&self, image: &str) -> ProcessResult<bool> {
        let filter = format!("IMAGENAME eq {image}");
        let output = Self::spawn(
            self.list_program,
            image,
            &["/FI", &filter, "/NH", "/FO", "CSV"],
        )?;
        if !output.status.success() {
            return Err(ProcessError::QueryFailed {
                image: image.to_string(),
                status: output.status.code(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let running = tasklist_reports_image(&stdout, image);
        debug!(image, running, "process table queried");
        Ok(running)
    }

    fn terminate(&self, image: &str) -> ProcessResult<()> {
        let output = Self::spawn(self.kill_program, image, &["/F", "/IM", image])?;
        if output.status.success() {
            debug!(image, "process terminated");
            Ok(())
        } else {
            Err(ProcessError::TerminateFailed {
                image: image.to_string(),
                status: output.status.code(),
            })
        }
    }
}

/// Whether `tasklist /NH /FO CSV` output lists a process named `image`.
///
/// Only the quoted first column is compared, case-insensitively; the
/// `INFO: No tasks are running...` notice never matches.
#[must_use]
pub fn tasklist_reports_image(output: &str, image: &str) -> bool {
    output.lines().any(|line| {
        line.trim()
            .strip_prefix('"')
            .and_then(|rest| rest.split_once('"'))
            .is_some_and(|(name, _)| name.eq_ignore_ascii_case(image))
    })
}

/// Drop image names that differ from an earlier entry only by ASCII case.
///
/// Windows treats image names case-insensitively, so `Code.exe` and
/// `code.exe` name the same processes; keeping both would make the second
/// termination fail once the first has succeeded.
#[must_use]
pub fn dedupe_image_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() || unique.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
            continue;
        }
        unique.push(name.to_string());
    }
    unique
}

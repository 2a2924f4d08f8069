//! Console progress lines and failure diagnostics.
//!
//! Console write failures are ignored; a closed stdout must not abort a run
//! that is halfway through rewriting the storage file.

use std::fmt::Display;
use std::io::Write;

use idreset_app::{RunError, RunEvent, RunFailure, RunReport, RunReporter, Step};
use idreset_config::ConfigError;
use idreset_core::IdentifierChange;
use idreset_fsops::FsOpsError;
use idreset_process::ProcessError;
use tokio::task::JoinError;

const RULE: &str = "==================================================";

/// Prints pipeline progress as human-readable lines.
pub(crate) struct ConsoleReporter<W> {
    out: W,
    app_name: String,
}

impl<W: Write> ConsoleReporter<W> {
    pub(crate) const fn new(out: W, app_name: String) -> Self {
        Self { out, app_name }
    }

    fn line(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "{text}");
    }

    fn changes(&mut self, heading: &str, changes: &[IdentifierChange], previous: bool) {
        self.line(format_args!("\n{heading}:"));
        for change in changes {
            let value = if previous {
                change.previous_display()
            } else {
                change.current.as_str().into()
            };
            self.line(format_args!("  {}: {value}", change.key.as_str()));
        }
    }
}

impl<W: Write> RunReporter for ConsoleReporter<W> {
    fn report(&mut self, event: &RunEvent) {
        match event {
            RunEvent::StepStarted(step) => match step {
                Step::Preflight => self.line("Checking the running environment..."),
                Step::Processes => {
                    let text = format!("Scanning for {} processes...", self.app_name);
                    self.line(text);
                }
                Step::Read => self.line("Reading storage file..."),
                Step::Mutate => self.line("Generating new telemetry identifiers..."),
                Step::Write => self.line("\nSaving storage file..."),
                Step::LockDown => self.line("Marking storage file read-only..."),
            },
            RunEvent::TargetResolved { path } => {
                self.line(format_args!("Target file: {}", path.display()));
            }
            RunEvent::ProcessesScanned { running } => {
                if running.is_empty() {
                    let text = format!("No {} processes found", self.app_name);
                    self.line(text);
                } else {
                    self.line(format_args!("Found running processes: {}", running.join(", ")));
                    self.line("Closing processes...");
                }
            }
            RunEvent::ProcessTerminated { image } => {
                self.line(format_args!("  Terminated process: {image}"));
            }
            RunEvent::ProcessTerminationFailed { image } => {
                self.line(format_args!("  Failed to terminate process: {image}"));
            }
            RunEvent::SettleDelay { delay } => {
                self.line("All processes closed");
                self.line(format_args!("Waiting {delay:?} for file locks to be released..."));
            }
            RunEvent::IdentifiersChanged { changes } => {
                self.changes("Original values", changes, true);
                self.changes("New values", changes, false);
            }
            RunEvent::StepCompleted(step) => match step {
                Step::Preflight => self.line("Target file exists"),
                Step::Read => self.line("Storage file read"),
                Step::Write => self.line("Storage file saved"),
                Step::LockDown => self.line("Storage file is now read-only"),
                Step::Processes | Step::Mutate => {}
            },
        }
    }
}

pub(crate) fn render_banner(out: &mut impl Write, app_name: &str) {
    let _ = writeln!(out, "{app_name} telemetry identifier reset");
    let _ = writeln!(out, "{RULE}");
}

pub(crate) fn render_success(out: &mut impl Write, report: &RunReport) {
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "Telemetry identifiers reset complete.");
    let _ = writeln!(
        out,
        "Note: {} is now read-only; clear the read-only flag before changing it again.",
        report.storage_path.display()
    );
}

pub(crate) fn render_failure(out: &mut impl Write, failure: &RunFailure, app_name: &str) {
    let _ = writeln!(out);
    for line in describe_error(&failure.error, app_name) {
        let _ = writeln!(out, "{line}");
    }
}

pub(crate) fn render_crash(out: &mut impl Write, err: &JoinError) {
    let cause = if err.is_panic() {
        "the reset task panicked"
    } else {
        "the reset task was cancelled"
    };
    let _ = writeln!(out, "\nUnexpected error: {cause}");
}

pub(crate) fn render_interrupted(out: &mut impl Write) {
    let _ = writeln!(out, "\n\nOperation interrupted by user");
}

/// Human-readable diagnostic lines for a run error, most important first.
pub(crate) fn describe_error(error: &RunError, app_name: &str) -> Vec<String> {
    match error {
        RunError::EnvironmentUnsupported { source } => match source {
            ConfigError::UnsupportedPlatform {
                os_family,
                required,
            } => vec![format!(
                "Error: this tool only supports {required} hosts (found {os_family})"
            )],
            ConfigError::MissingEnv { name } => {
                vec![format!("Error: cannot read the {name} environment variable")]
            }
        },
        RunError::TargetMissing { path } => vec![format!(
            "Error: target file does not exist: {}",
            path.display()
        )],
        RunError::ProcessScanFailed { source } => vec![
            format!(
                "Error: could not check whether {} is running: {}",
                source.image(),
                process_detail(source)
            ),
            format!("Please close {app_name} manually and try again."),
        ],
        RunError::ProcessTerminationFailed { .. } => vec![
            format!(
                "Error: failed to terminate {}",
                error.failed_images().join(", ")
            ),
            format!("Please close {app_name} manually and try again."),
        ],
        RunError::DecodeError { source } => vec![format!(
            "Error: {} is not a valid JSON object: {}",
            source.path().display(),
            fs_detail(source)
        )],
        RunError::IoReadError { source } => vec![format!(
            "Error: failed to read {}: {}",
            source.path().display(),
            fs_detail(source)
        )],
        RunError::IoWriteError { source } => vec![format!(
            "Error: failed to save {}: {}",
            source.path().display(),
            fs_detail(source)
        )],
        RunError::PermissionChangeError { source } => vec![format!(
            "Error: failed to change the read-only flag on {}: {}",
            source.path().display(),
            fs_detail(source)
        )],
    }
}

fn process_detail(error: &ProcessError) -> String {
    match error {
        ProcessError::Spawn { program, source, .. } => {
            format!("{program} could not be started: {source}")
        }
        ProcessError::QueryFailed { status, .. } | ProcessError::TerminateFailed { status, .. } => {
            status.map_or_else(
                || "terminated by signal".to_string(),
                |code| format!("exit status {code}"),
            )
        }
    }
}

fn fs_detail(error: &FsOpsError) -> String {
    match error {
        FsOpsError::Io { source, .. } => source.to_string(),
        FsOpsError::Json { source, .. } => source.to_string(),
        FsOpsError::NotAnObject { found, .. } => {
            format!("top-level value is {found}, expected an object")
        }
    }
}

//! Sequential reset pipeline.
//!
//! # Design
//! - Steps run strictly in order; the first failure aborts the rest and nothing is rolled back.
//! - OS access goes through the injected process and attribute controllers.
//! - Randomness and progress reporting are passed in per run.

use std::path::{Path, PathBuf};
use std::thread;

use idreset_config::{HostEnvironment, ResetSettings, resolve_storage_path};
use idreset_core::{IdentifierChange, StorageDocument, TelemetryIds, apply_identifiers};
use idreset_fsops::{FileAttributeController, read_storage, write_storage};
use idreset_process::{ProcessController, ProcessError, dedupe_image_names};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::{RunError, RunFailure};
use crate::reporter::{RunEvent, RunReporter};
use crate::stage::{RunStage, Step};

/// Outcome of a run that reached [`RunStage::Done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Final stage; always [`RunStage::Done`].
    pub stage: RunStage,
    /// Storage file that was rewritten and locked.
    pub storage_path: PathBuf,
    /// Images that were running and got terminated.
    pub terminated: Vec<String>,
    /// Before/after values of the managed keys.
    pub changes: Vec<IdentifierChange>,
}

/// The six-step reset run over injected OS collaborators.
#[derive(Debug)]
pub struct ResetPipeline<P, A> {
    host: HostEnvironment,
    settings: ResetSettings,
    processes: P,
    attributes: A,
}

impl<P, A> ResetPipeline<P, A>
where
    P: ProcessController,
    A: FileAttributeController,
{
    /// Assemble a pipeline for one host and settings pair.
    #[must_use]
    pub const fn new(
        host: HostEnvironment,
        settings: ResetSettings,
        processes: P,
        attributes: A,
    ) -> Self {
        Self {
            host,
            settings,
            processes,
            attributes,
        }
    }

    /// Execute every step in order.
    ///
    /// # Errors
    ///
    /// Returns a [`RunFailure`] naming the last completed stage as soon as a
    /// step fails; later steps are not attempted.
    pub fn run<R, Rep>(&self, rng: &mut R, reporter: &mut Rep) -> Result<RunReport, RunFailure>
    where
        R: Rng + ?Sized,
        Rep: RunReporter + ?Sized,
    {
        let mut stage = RunStage::Init;

        let storage_path = execute_step(Step::Preflight, &mut stage, reporter, |reporter| {
            self.preflight(reporter)
        })?;
        let terminated = execute_step(Step::Processes, &mut stage, reporter, |reporter| {
            self.clear_processes(reporter)
        })?;
        let mut document = execute_step(Step::Read, &mut stage, reporter, |_| {
            read_storage(&storage_path).map_err(RunError::from_read)
        })?;
        let changes = execute_step(Step::Mutate, &mut stage, reporter, |reporter| {
            let ids = TelemetryIds::generate(rng);
            let changes = apply_identifiers(&mut document, &ids);
            reporter.report(&RunEvent::IdentifiersChanged {
                changes: changes.clone(),
            });
            Ok(changes)
        })?;
        execute_step(Step::Write, &mut stage, reporter, |_| {
            self.write_back(&storage_path, &document)
        })?;
        execute_step(Step::LockDown, &mut stage, reporter, |_| {
            self.attributes
                .make_read_only(&storage_path)
                .map_err(|source| RunError::PermissionChangeError { source })
        })?;

        info!(path = %storage_path.display(), "telemetry identifiers reset");
        Ok(RunReport {
            stage: RunStage::Done,
            storage_path,
            terminated,
            changes,
        })
    }

    fn preflight<Rep>(&self, reporter: &mut Rep) -> Result<PathBuf, RunError>
    where
        Rep: RunReporter + ?Sized,
    {
        let path = resolve_storage_path(&self.host, &self.settings)
            .map_err(|source| RunError::EnvironmentUnsupported { source })?;
        reporter.report(&RunEvent::TargetResolved { path: path.clone() });
        if !path.is_file() {
            return Err(RunError::TargetMissing { path });
        }
        Ok(path)
    }

    fn clear_processes<Rep>(&self, reporter: &mut Rep) -> Result<Vec<String>, RunError>
    where
        Rep: RunReporter + ?Sized,
    {
        let mut running = Vec::new();
        for image in dedupe_image_names(&self.settings.process_names) {
            if self.is_running(&image)? {
                running.push(image);
            }
        }
        reporter.report(&RunEvent::ProcessesScanned {
            running: running.clone(),
        });
        if running.is_empty() {
            return Ok(running);
        }

        let mut failed = Vec::new();
        for image in &running {
            if let Err(error) = self.processes.terminate(image) {
                warn!(image = %image, error = %error, "process survived termination request");
                reporter.report(&RunEvent::ProcessTerminationFailed {
                    image: image.clone(),
                });
                failed.push(error);
                continue;
            }
            reporter.report(&RunEvent::ProcessTerminated {
                image: image.clone(),
            });
        }
        if !failed.is_empty() {
            return Err(RunError::ProcessTerminationFailed { failed });
        }

        let delay = self.settings.settle_delay;
        if !delay.is_zero() {
            reporter.report(&RunEvent::SettleDelay { delay });
            thread::sleep(delay);
        }
        Ok(running)
    }

    /// A query that ran but exited unsuccessfully counts as "not running";
    /// a helper that cannot be started at all aborts the scan.
    fn is_running(&self, image: &str) -> Result<bool, RunError> {
        match self.processes.is_running(image) {
            Err(ProcessError::QueryFailed { status, .. }) => {
                warn!(image, ?status, "process query failed; treating image as not running");
                Ok(false)
            }
            other => other.map_err(|source| RunError::ProcessScanFailed { source }),
        }
    }

    fn write_back(&self, path: &Path, document: &StorageDocument) -> Result<(), RunError> {
        if path.exists() {
            self.attributes
                .make_writable(path)
                .map_err(|source| RunError::PermissionChangeError { source })?;
        }
        write_storage(path, document).map_err(|source| RunError::IoWriteError { source })
    }
}

fn execute_step<T, Rep, F>(
    step: Step,
    stage: &mut RunStage,
    reporter: &mut Rep,
    op: F,
) -> Result<T, RunFailure>
where
    Rep: RunReporter + ?Sized,
    F: FnOnce(&mut Rep) -> Result<T, RunError>,
{
    debug!(step = step.as_str(), stage = stage.as_str(), "step started");
    reporter.report(&RunEvent::StepStarted(step));

    let value = op(reporter).map_err(|error| {
        warn!(
            step = step.as_str(),
            stage = stage.as_str(),
            error = %error,
            path = ?error.path(),
            "step failed"
        );
        RunFailure {
            stage: *stage,
            error,
        }
    })?;

    *stage = step.completed_stage();
    debug!(
        step = step.as_str(),
        stage = stage.as_str(),
        "step completed"
    );
    reporter.report(&RunEvent::StepCompleted(step));
    Ok(value)
}

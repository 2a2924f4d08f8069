//! Progress events emitted while a reset run executes.

use std::path::PathBuf;
use std::time::Duration;

use idreset_core::IdentifierChange;

use crate::stage::Step;

/// Something observable happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A step began.
    StepStarted(Step),
    /// The storage file was located.
    TargetResolved {
        /// Resolved storage file path.
        path: PathBuf,
    },
    /// The process table scan finished.
    ProcessesScanned {
        /// Images found running, in scan order.
        running: Vec<String>,
    },
    /// A running image was terminated.
    ProcessTerminated {
        /// Terminated image name.
        image: String,
    },
    /// A running image survived its termination request.
    ProcessTerminationFailed {
        /// Image name that is still running.
        image: String,
    },
    /// The run is waiting for file locks to be released.
    SettleDelay {
        /// Length of the wait.
        delay: Duration,
    },
    /// The managed keys were replaced in memory.
    IdentifiersChanged {
        /// Before/after values in reporting order.
        changes: Vec<IdentifierChange>,
    },
    /// A step finished successfully.
    StepCompleted(Step),
}

/// Receives [`RunEvent`]s as the pipeline emits them.
pub trait RunReporter {
    /// Handle one event.
    fn report(&mut self, event: &RunEvent);
}

impl<T: RunReporter + ?Sized> RunReporter for &mut T {
    fn report(&mut self, event: &RunEvent) {
        (**self).report(event);
    }
}

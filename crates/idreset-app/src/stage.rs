//! Run state machine and the steps that advance it.

/// State of a reset run.
///
/// A run advances `Init → PreflightOk → ProcessesClear → FileRead →
/// FileMutated → FileWritten → Locked → Done`. A failing step aborts the run
/// instead; the returned `RunFailure` records the last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStage {
    /// Nothing has happened yet.
    Init,
    /// Platform checked and target file found.
    PreflightOk,
    /// No target process is running any more.
    ProcessesClear,
    /// Storage document decoded.
    FileRead,
    /// Identifiers replaced in memory.
    FileMutated,
    /// Document written back to disk.
    FileWritten,
    /// File marked read-only.
    Locked,
    /// Run finished successfully.
    Done,
}

impl RunStage {
    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::PreflightOk => "preflight_ok",
            Self::ProcessesClear => "processes_clear",
            Self::FileRead => "file_read",
            Self::FileMutated => "file_mutated",
            Self::FileWritten => "file_written",
            Self::Locked => "locked",
            Self::Done => "done",
        }
    }
}

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Check the platform and locate the storage file.
    Preflight,
    /// Find and terminate the editor processes.
    Processes,
    /// Read and decode the storage file.
    Read,
    /// Generate identifiers and apply them to the document.
    Mutate,
    /// Clear the read-only flag and write the document back.
    Write,
    /// Mark the storage file read-only.
    LockDown,
}

impl Step {
    /// Every step, in execution order.
    pub const ALL: [Self; 6] = [
        Self::Preflight,
        Self::Processes,
        Self::Read,
        Self::Mutate,
        Self::Write,
        Self::LockDown,
    ];

    /// Stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Processes => "processes",
            Self::Read => "read",
            Self::Mutate => "mutate",
            Self::Write => "write",
            Self::LockDown => "lock_down",
        }
    }

    /// Stage the run reaches once this step succeeds.
    #[must_use]
    pub const fn completed_stage(self) -> RunStage {
        match self {
            Self::Preflight => RunStage::PreflightOk,
            Self::Processes => RunStage::ProcessesClear,
            Self::Read => RunStage::FileRead,
            Self::Mutate => RunStage::FileMutated,
            Self::Write => RunStage::FileWritten,
            Self::LockDown => RunStage::Locked,
        }
    }
}

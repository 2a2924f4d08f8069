//! Argument parsing and the interruptible reset run.

use std::future;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use idreset_app::{ResetPipeline, RunFailure, RunReport};
use idreset_config::defaults::{DEFAULT_APP_NAME, DEFAULT_SETTLE_DELAY};
use idreset_config::{HostEnvironment, ResetSettings};
use idreset_fsops::StdFileAttributes;
use idreset_process::TaskListController;
use idreset_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tokio::task::{self, JoinError};
use tracing::{debug, warn};

use crate::output::{self, ConsoleReporter};
use crate::pause::{pause_before_exit, should_pause};

/// Parse arguments, run the reset, and return the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);

    let host = HostEnvironment::from_env();
    let settings = cli.settings();
    let app_name = settings.app_name.clone();
    debug!(os_family = %host.os_family, app = %app_name, "starting identifier reset");

    output::render_banner(&mut io::stdout(), &app_name);
    let outcome = execute(host, settings).await;
    outcome.render(&app_name);

    let exit_code = outcome.exit_code();
    if should_pause(
        cli.no_pause,
        matches!(outcome, Outcome::Interrupted),
        io::stdin().is_terminal(),
    ) {
        pause_before_exit(&mut io::stdin().lock(), &mut io::stdout());
    }
    exit_code
}

#[derive(Parser, Debug)]
#[command(
    name = "idreset",
    version,
    about = "Reset the editor's telemetry identifiers and lock the storage file"
)]
pub(crate) struct Cli {
    /// Storage file to rewrite instead of the one under APPDATA.
    #[arg(long, env = "IDRESET_STORAGE_PATH")]
    storage_path: Option<PathBuf>,
    /// Application directory name under APPDATA.
    #[arg(long, env = "IDRESET_APP_NAME", default_value = DEFAULT_APP_NAME)]
    app_name: String,
    /// Seconds to wait after terminating processes.
    #[arg(long, env = "IDRESET_SETTLE_SECS", default_value_t = DEFAULT_SETTLE_DELAY.as_secs())]
    settle_secs: u64,
    /// Exit without waiting for Enter.
    #[arg(long, env = "IDRESET_NO_PAUSE")]
    no_pause: bool,
    /// Log output format (`pretty` or `json`).
    #[arg(long, env = "IDRESET_LOG_FORMAT")]
    log_format: Option<LogFormat>,
    /// Log level or filter directive; `RUST_LOG` takes precedence.
    #[arg(long, env = "IDRESET_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

impl Cli {
    fn settings(&self) -> ResetSettings {
        let mut settings = ResetSettings::default()
            .with_app_name(self.app_name.clone())
            .with_settle_delay(Duration::from_secs(self.settle_secs));
        if let Some(path) = &self.storage_path {
            settings = settings.with_storage_path(path.clone());
        }
        settings
    }

    fn logging_config(&self) -> LoggingConfig<'_> {
        LoggingConfig {
            level: &self.log_level,
            format: self.log_format.unwrap_or_else(LogFormat::infer),
        }
    }
}

fn install_logging(cli: &Cli) {
    if let Err(err) = init_logging(&cli.logging_config()) {
        eprintln!("warning: logging disabled: {err:#}");
    }
}

/// How a run ended.
#[derive(Debug)]
pub(crate) enum Outcome {
    Completed(RunReport),
    Aborted(RunFailure),
    Crashed(JoinError),
    Interrupted,
}

impl Outcome {
    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(_) => 0,
            Self::Aborted(_) | Self::Crashed(_) | Self::Interrupted => 1,
        }
    }

    fn render(&self, app_name: &str) {
        let mut stdout = io::stdout();
        match self {
            Self::Completed(report) => output::render_success(&mut stdout, report),
            Self::Aborted(failure) => output::render_failure(&mut stdout, failure, app_name),
            Self::Crashed(err) => output::render_crash(&mut stdout, err),
            Self::Interrupted => output::render_interrupted(&mut stdout),
        }
    }
}

/// Run the blocking pipeline on the blocking pool, racing it against Ctrl-C.
///
/// An interrupt does not cancel the pipeline thread; the process exits
/// shortly afterwards and takes it down.
async fn execute(host: HostEnvironment, settings: ResetSettings) -> Outcome {
    let app_name = settings.app_name.clone();
    let pipeline_task = task::spawn_blocking(move || {
        let pipeline = ResetPipeline::new(
            host,
            settings,
            TaskListController::new(),
            StdFileAttributes,
        );
        let mut reporter = ConsoleReporter::new(io::stdout(), app_name);
        pipeline.run(&mut rand::rng(), &mut reporter)
    });

    tokio::select! {
        joined = pipeline_task => match joined {
            Ok(Ok(report)) => Outcome::Completed(report),
            Ok(Err(failure)) => Outcome::Aborted(failure),
            Err(err) => Outcome::Crashed(err),
        },
        () = interrupted() => Outcome::Interrupted,
    }
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "unable to listen for interrupts");
        future::pending::<()>().await;
    }
}

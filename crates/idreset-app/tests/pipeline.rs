use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use idreset_app::{ResetPipeline, RunError, RunEvent, RunReporter, RunStage, Step};
use idreset_config::{ConfigError, HostEnvironment};
use idreset_core::{NOT_SET_MARKER, TelemetryKey};
use idreset_fsops::is_read_only;
use idreset_process::ProcessError;
use idreset_test_support::fixtures::{
    fast_settings, storage_path, windows_host, write_storage_fixture,
};
use idreset_test_support::mocks::{
    AttributeCall, FakeProcessController, ProcessCall, RecordingAttributes,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;
use serde_json::{Map, Value, json};

type TestResult<T> = Result<T, Box<dyn Error>>;

#[derive(Default)]
struct RecordingReporter {
    events: Vec<RunEvent>,
}

impl RunReporter for RecordingReporter {
    fn report(&mut self, event: &RunEvent) {
        self.events.push(event.clone());
    }
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(0x1d5e7)
}

fn read_object(path: &Path) -> TestResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(&fs::read_to_string(path)?)? {
        Value::Object(map) => Ok(map),
        other => Err(format!("expected object, got {other}").into()),
    }
}

#[test]
fn single_key_document_gains_all_three_identifiers() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = write_storage_fixture(dir.path(), r#"{"telemetry.machineId": "abc123"}"#)?;
    let attributes = RecordingAttributes::new();
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        FakeProcessController::new(),
        &attributes,
    );

    let mut reporter = RecordingReporter::default();
    let report = pipeline.run(&mut rng(), &mut reporter)?;

    let written = read_object(&path)?;
    assert_eq!(written.len(), 3);
    let hex = Regex::new("^[0-9a-f]{32}$")?;
    let sqm = Regex::new(
        "^\\{[0-9A-F]{8}-[0-9A-F]{4}-4[0-9A-F]{3}-[89AB][0-9A-F]{3}-[0-9A-F]{12}\\}$",
    )?;
    let text = |key: TelemetryKey| {
        written[key.as_str()]
            .as_str()
            .unwrap_or_default()
            .to_string()
    };
    assert!(hex.is_match(&text(TelemetryKey::MachineId)));
    assert_ne!(text(TelemetryKey::MachineId), "abc123");
    assert!(sqm.is_match(&text(TelemetryKey::SqmId)));
    assert!(hex.is_match(&text(TelemetryKey::DevDeviceId)));

    assert_eq!(report.stage, RunStage::Done);
    assert_eq!(report.storage_path, path);
    assert!(report.terminated.is_empty());
    assert_eq!(report.changes[0].previous_display(), "abc123");
    assert_eq!(report.changes[1].previous_display(), NOT_SET_MARKER);
    assert_eq!(report.changes[2].previous_display(), NOT_SET_MARKER);
    for change in &report.changes {
        assert_eq!(text(change.key), change.current);
    }

    assert!(is_read_only(&path)?);
    assert_eq!(
        attributes.calls(),
        vec![
            AttributeCall::MakeWritable(path.clone()),
            AttributeCall::MakeReadOnly(path)
        ]
    );
    assert!(reporter.events.iter().any(|event| matches!(
        event,
        RunEvent::IdentifiersChanged { changes } if changes == &report.changes
    )));
    Ok(())
}

#[test]
fn unrelated_keys_survive_a_run() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let original = json!({
        "window.zoom": 1.25,
        "telemetry.sqmId": "{OLD}",
        "recent": ["a", "b"],
        "nested": { "deep": { "flag": true, "none": null } },
        "greeting": "héllo ✓",
    });
    let path = write_storage_fixture(dir.path(), &serde_json::to_string(&original)?)?;
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        FakeProcessController::new(),
        RecordingAttributes::new(),
    );
    pipeline.run(&mut rng(), &mut RecordingReporter::default())?;

    let written = read_object(&path)?;
    for key in ["window.zoom", "recent", "nested", "greeting"] {
        assert_eq!(written.get(key), original.get(key), "{key} changed");
    }
    let keys: Vec<&str> = written.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "window.zoom",
            "telemetry.sqmId",
            "recent",
            "nested",
            "greeting",
            "telemetry.machineId",
            "telemetry.devDeviceId"
        ]
    );
    assert!(fs::read_to_string(&path)?.contains("héllo ✓"));
    Ok(())
}

#[test]
fn running_processes_are_terminated_before_the_file_is_read() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    write_storage_fixture(dir.path(), "{}")?;
    let processes = FakeProcessController::new().with_running(["Windsurf.exe", "code.exe"]);
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        &processes,
        RecordingAttributes::new(),
    );

    let mut reporter = RecordingReporter::default();
    let report = pipeline.run(&mut rng(), &mut reporter)?;

    // `Code.exe` and `code.exe` are one image; the first spelling is used.
    assert_eq!(report.terminated, vec!["Windsurf.exe", "Code.exe"]);
    assert_eq!(
        processes.calls(),
        vec![
            ProcessCall::Query("Windsurf.exe".to_string()),
            ProcessCall::Query("Code.exe".to_string()),
            ProcessCall::Terminate("Windsurf.exe".to_string()),
            ProcessCall::Terminate("Code.exe".to_string()),
        ]
    );
    assert!(!processes.still_running("Windsurf.exe"));
    assert!(!processes.still_running("code.exe"));
    assert!(
        !reporter
            .events
            .iter()
            .any(|event| matches!(event, RunEvent::SettleDelay { .. }))
    );
    Ok(())
}

#[test]
fn no_running_processes_means_no_termination() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    write_storage_fixture(dir.path(), "{}")?;
    let processes = FakeProcessController::new();
    let settings = fast_settings().with_settle_delay(Duration::from_secs(60));
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        settings,
        &processes,
        RecordingAttributes::new(),
    );

    let mut reporter = RecordingReporter::default();
    let report = pipeline.run(&mut rng(), &mut reporter)?;

    assert_eq!(report.stage, RunStage::Done);
    assert!(processes.termination_requests().is_empty());
    // Three configured names, two distinct images.
    assert_eq!(processes.calls().len(), 2);
    assert!(reporter.events.contains(&RunEvent::ProcessesScanned {
        running: Vec::new()
    }));
    assert!(
        !reporter
            .events
            .iter()
            .any(|event| matches!(event, RunEvent::SettleDelay { .. }))
    );
    Ok(())
}

#[test]
fn settle_delay_follows_successful_termination() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    write_storage_fixture(dir.path(), "{}")?;
    let delay = Duration::from_millis(20);
    let processes = FakeProcessController::new().with_running(["Windsurf.exe"]);
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings().with_settle_delay(delay),
        &processes,
        RecordingAttributes::new(),
    );

    let mut reporter = RecordingReporter::default();
    let started = Instant::now();
    pipeline.run(&mut rng(), &mut reporter)?;
    let elapsed = started.elapsed();

    let position = |wanted: &RunEvent| reporter.events.iter().position(|event| event == wanted);
    let terminated = position(&RunEvent::ProcessTerminated {
        image: "Windsurf.exe".to_string(),
    })
    .ok_or("termination not reported")?;
    let settled = position(&RunEvent::SettleDelay { delay })
        .ok_or("delay not reported")?;
    let completed = position(&RunEvent::StepCompleted(Step::Processes))
        .ok_or("step not completed")?;
    assert!(terminated < settled, "delay reported before termination");
    assert!(settled < completed, "step completed before the delay");
    assert!(
        elapsed >= delay,
        "run took {elapsed:?}, expected at least {delay:?}"
    );
    Ok(())
}

#[test]
fn unstartable_process_helper_aborts_the_scan() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let contents = "{\"telemetry.machineId\":\"keep\"}";
    let path = write_storage_fixture(dir.path(), contents)?;
    let processes = FakeProcessController::new()
        .with_running(["Windsurf.exe"])
        .with_unspawnable("Windsurf.exe");
    let attributes = RecordingAttributes::new();
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        &processes,
        &attributes,
    );

    let mut reporter = RecordingReporter::default();
    let failure = pipeline
        .run(&mut rng(), &mut reporter)
        .expect_err("scan failure aborts");

    assert_eq!(failure.stage, RunStage::PreflightOk);
    assert!(matches!(
        failure.error,
        RunError::ProcessScanFailed {
            source: ProcessError::Spawn { .. }
        }
    ));
    assert!(processes.termination_requests().is_empty());
    assert!(processes.still_running("Windsurf.exe"));
    assert_eq!(fs::read(&path)?, contents.as_bytes());
    assert!(attributes.calls().is_empty());
    assert!(
        !reporter
            .events
            .iter()
            .any(|event| matches!(event, RunEvent::ProcessesScanned { .. }))
    );
    Ok(())
}

#[test]
fn termination_failure_stops_before_the_file_is_touched() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let contents = "{\"telemetry.machineId\":\"keep\",\"other\":1}";
    let path = write_storage_fixture(dir.path(), contents)?;
    let processes = FakeProcessController::new()
        .with_running(["Windsurf.exe", "Code.exe"])
        .with_unkillable("Code.exe");
    let attributes = RecordingAttributes::new();
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        &processes,
        &attributes,
    );

    let mut reporter = RecordingReporter::default();
    let failure = pipeline
        .run(&mut rng(), &mut reporter)
        .expect_err("termination failure aborts");

    assert_eq!(failure.stage, RunStage::PreflightOk);
    assert!(matches!(
        failure.error,
        RunError::ProcessTerminationFailed { .. }
    ));
    assert_eq!(failure.error.failed_images(), vec!["Code.exe"]);
    assert_eq!(fs::read(&path)?, contents.as_bytes());
    assert!(attributes.calls().is_empty());
    assert!(!is_read_only(&path)?);
    assert!(reporter.events.contains(&RunEvent::ProcessTerminated {
        image: "Windsurf.exe".to_string()
    }));
    assert!(reporter.events.contains(&RunEvent::ProcessTerminationFailed {
        image: "Code.exe".to_string()
    }));
    Ok(())
}

#[test]
fn missing_target_aborts_at_preflight() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let processes = FakeProcessController::new().with_running(["Windsurf.exe"]);
    let attributes = RecordingAttributes::new();
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        &processes,
        &attributes,
    );

    let failure = pipeline
        .run(&mut rng(), &mut RecordingReporter::default())
        .expect_err("missing file aborts");

    assert_eq!(failure.stage, RunStage::Init);
    assert!(matches!(
        &failure.error,
        RunError::TargetMissing { path } if path == &storage_path(dir.path())
    ));
    assert!(processes.calls().is_empty());
    assert!(processes.still_running("Windsurf.exe"));
    assert!(attributes.calls().is_empty());
    assert!(!storage_path(dir.path()).exists());
    Ok(())
}

#[test]
fn unsupported_platform_aborts_at_preflight() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    write_storage_fixture(dir.path(), "{}")?;
    let host = HostEnvironment {
        os_family: "unix".to_string(),
        app_data: Some(dir.path().to_path_buf()),
    };
    let processes = FakeProcessController::new();
    let pipeline =
        ResetPipeline::new(host, fast_settings(), &processes, RecordingAttributes::new());

    let failure = pipeline
        .run(&mut rng(), &mut RecordingReporter::default())
        .expect_err("unsupported platform");
    assert!(matches!(
        failure.error,
        RunError::EnvironmentUnsupported {
            source: ConfigError::UnsupportedPlatform { .. }
        }
    ));
    assert!(processes.calls().is_empty());
    Ok(())
}

#[test]
fn missing_app_data_aborts_at_preflight() {
    let host = HostEnvironment {
        os_family: "windows".to_string(),
        app_data: None,
    };
    let pipeline = ResetPipeline::new(
        host,
        fast_settings(),
        FakeProcessController::new(),
        RecordingAttributes::new(),
    );
    let failure = pipeline
        .run(&mut rng(), &mut RecordingReporter::default())
        .expect_err("missing APPDATA");
    assert!(matches!(
        failure.error,
        RunError::EnvironmentUnsupported {
            source: ConfigError::MissingEnv { name: "APPDATA" }
        }
    ));
}

#[test]
fn invalid_json_is_a_decode_error_and_leaves_the_file_alone() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = write_storage_fixture(dir.path(), "{ not json")?;
    let attributes = RecordingAttributes::new();
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        FakeProcessController::new(),
        &attributes,
    );

    let failure = pipeline
        .run(&mut rng(), &mut RecordingReporter::default())
        .expect_err("decode error");

    assert_eq!(failure.stage, RunStage::ProcessesClear);
    assert!(matches!(failure.error, RunError::DecodeError { .. }));
    assert_eq!(failure.error.path(), Some(path.as_path()));
    assert_eq!(fs::read_to_string(&path)?, "{ not json");
    assert!(attributes.calls().is_empty());
    assert!(!is_read_only(&path)?);
    Ok(())
}

#[test]
fn read_only_file_from_a_previous_run_is_rewritten() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = write_storage_fixture(dir.path(), r#"{"telemetry.devDeviceId": "old"}"#)?;
    let mut permissions = fs::metadata(&path)?.permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&path, permissions)?;

    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        FakeProcessController::new(),
        RecordingAttributes::new(),
    );
    let report = pipeline.run(&mut rng(), &mut RecordingReporter::default())?;

    let written = read_object(&path)?;
    assert_ne!(written["telemetry.devDeviceId"], json!("old"));
    assert_eq!(report.changes[2].previous_display(), "old");
    assert!(is_read_only(&path)?);
    Ok(())
}

#[test]
fn permission_failure_before_write_aborts_without_writing() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = write_storage_fixture(dir.path(), "{}")?;
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        FakeProcessController::new(),
        RecordingAttributes::new().failing_writable(),
    );

    let failure = pipeline
        .run(&mut rng(), &mut RecordingReporter::default())
        .expect_err("permission failure");

    assert_eq!(failure.stage, RunStage::FileMutated);
    assert!(matches!(
        failure.error,
        RunError::PermissionChangeError { .. }
    ));
    assert_eq!(fs::read_to_string(&path)?, "{}");
    Ok(())
}

#[test]
fn lock_down_failure_is_reported_after_the_write() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = write_storage_fixture(dir.path(), "{}")?;
    let pipeline = ResetPipeline::new(
        windows_host(dir.path()),
        fast_settings(),
        FakeProcessController::new(),
        RecordingAttributes::new().failing_read_only(),
    );

    let failure = pipeline
        .run(&mut rng(), &mut RecordingReporter::default())
        .expect_err("lock-down failure");

    assert_eq!(failure.stage, RunStage::FileWritten);
    assert!(matches!(
        failure.error,
        RunError::PermissionChangeError { .. }
    ));
    assert_eq!(read_object(&path)?.len(), 3);
    assert!(!is_read_only(&path)?);
    Ok(())
}

#[test]
fn storage_path_override_is_used() -> TestResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("custom.json");
    fs::write(&path, "{}")?;
    let host = HostEnvironment {
        os_family: "windows".to_string(),
        app_data: None,
    };
    let pipeline = ResetPipeline::new(
        host,
        fast_settings().with_storage_path(&path),
        FakeProcessController::new(),
        RecordingAttributes::new(),
    );
    let report = pipeline.run(&mut rng(), &mut RecordingReporter::default())?;
    assert_eq!(report.storage_path, path);
    assert_eq!(read_object(&path)?.len(), 3);
    Ok(())
}

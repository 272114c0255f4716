//! Integration tests driving the full pipeline with stub interpreters.
//!
//! `true` stands in for an interpreter whose children all succeed,
//! `false` for one whose children all fail; both ignore their arguments,
//! which is enough to exercise gating, abort and skip semantics.

use band_suite::{BandSuite, SuiteConfig, TOOL_DIR};
use std::path::Path;

fn stub_config(root: &Path, interpreter: &str) -> SuiteConfig {
    let mut config = SuiteConfig::new(root);
    config.interpreter = interpreter.to_string();
    config.package_manager = "true".to_string();
    config
}

fn make_tool_dir(root: &Path) -> std::path::PathBuf {
    let tool = root.join(TOOL_DIR);
    std::fs::create_dir_all(&tool).expect("create tool dir");
    tool
}

/// Test: green run with no optional prerequisites present.
#[tokio::test]
async fn test_green_run_without_optional_steps() {
    let dir = tempfile::tempdir().expect("tempdir");
    make_tool_dir(dir.path());

    let config = stub_config(dir.path(), "true");
    let out_dir = config.out_dir.clone();
    let rc = BandSuite::new(config).run().await.expect("run failed");

    assert_eq!(rc, 0);
    assert!(out_dir.join("meta.json").exists());
    assert!(out_dir.join("sanity.txt").exists());
    assert!(out_dir.join("make_sample.log").exists());
    assert!(
        out_dir.join("run_dd_missing.txt").exists(),
        "absent smoke script must leave a marker"
    );
    assert!(!out_dir.join("pytest_dd.log").exists());
    assert!(!out_dir.join("run_dd_smoke.log").exists());
    assert!(!out_dir.join("run_dd_batch.log").exists());

    let sanity = std::fs::read_to_string(out_dir.join("sanity.txt")).expect("read sanity");
    assert!(sanity.contains("has_dd_tool=true"));
    assert!(sanity.contains("has_tests=false"));
}

/// Test: a failing unit-test step aborts before any later step runs.
#[tokio::test]
async fn test_failing_unit_tests_abort_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool = make_tool_dir(dir.path());
    std::fs::create_dir_all(tool.join("tests")).expect("create tests dir");

    let config = stub_config(dir.path(), "false");
    let out_dir = config.out_dir.clone();
    let rc = BandSuite::new(config).run().await.expect("run failed");

    assert_eq!(rc, 1, "suite must return the failing step's exit code");
    assert!(out_dir.join("meta.json").exists(), "metadata precedes steps");
    assert!(out_dir.join("pytest_dd.log").exists());
    assert!(
        !out_dir.join("make_sample.log").exists(),
        "no step may run after an abort"
    );
}

/// Test: a failing fixture step prevents the smoke run even when the
/// smoke script exists.
#[tokio::test]
async fn test_fixture_failure_prevents_smoke() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool = make_tool_dir(dir.path());
    std::fs::create_dir_all(tool.join("scripts")).expect("create scripts dir");
    std::fs::write(tool.join("scripts/run_dd.py"), "# smoke stub\n").expect("write script");

    let config = stub_config(dir.path(), "false");
    let out_dir = config.out_dir.clone();
    let rc = BandSuite::new(config).run().await.expect("run failed");

    assert_eq!(rc, 1);
    assert!(out_dir.join("make_sample.log").exists());
    assert!(!out_dir.join("run_dd_smoke.log").exists());
    assert!(!out_dir.join("out_dd").exists());
}

/// Test: unit tests run and pass when the test directory exists.
#[tokio::test]
async fn test_unit_tests_run_when_present() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool = make_tool_dir(dir.path());
    std::fs::create_dir_all(tool.join("tests")).expect("create tests dir");

    let config = stub_config(dir.path(), "true");
    let out_dir = config.out_dir.clone();
    let rc = BandSuite::new(config).run().await.expect("run failed");

    assert_eq!(rc, 0);
    let log = std::fs::read_to_string(out_dir.join("pytest_dd.log")).expect("read log");
    assert!(log.starts_with("+ true -m pytest -q "));
}

/// Test: present smoke script runs against the generated fixture.
#[tokio::test]
async fn test_smoke_script_present_runs_smoke() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool = make_tool_dir(dir.path());
    std::fs::create_dir_all(tool.join("scripts")).expect("create scripts dir");
    std::fs::write(tool.join("scripts/run_dd.py"), "# smoke stub\n").expect("write script");

    let config = stub_config(dir.path(), "true");
    let out_dir = config.out_dir.clone();
    let rc = BandSuite::new(config).run().await.expect("run failed");

    assert_eq!(rc, 0);
    assert!(out_dir.join("out_dd").is_dir());
    assert!(!out_dir.join("run_dd_missing.txt").exists());

    let log = std::fs::read_to_string(out_dir.join("run_dd_smoke.log")).expect("read log");
    let header = log.lines().next().expect("header line");
    assert!(header.contains("--input"));
    assert!(header.contains("sample.csv"));
    assert!(header.contains("--cols x,y"));
}

/// Test: batch prerequisites present but no candidates means a silent
/// skip: no batch log, suite still green.
#[tokio::test]
async fn test_batch_skipped_without_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool = make_tool_dir(dir.path());
    std::fs::create_dir_all(tool.join("scripts")).expect("create scripts dir");
    std::fs::write(tool.join("scripts/run_dd_batch.py"), "# batch stub\n").expect("write script");
    std::fs::write(dir.path().join("dd_params.small.json"), "{}\n").expect("write config");
    // Only excluded inputs exist.
    std::fs::write(tool.join("x_uuid.csv"), "a,b\n").expect("write csv");
    std::fs::write(tool.join("y_orig.csv"), "a,b\n").expect("write csv");

    let config = stub_config(dir.path(), "true");
    let out_dir = config.out_dir.clone();
    let rc = BandSuite::new(config).run().await.expect("run failed");

    assert_eq!(rc, 0);
    assert!(!out_dir.join("run_dd_batch.log").exists());
}

/// Test: batch run receives the sorted, filtered candidate set.
#[tokio::test]
async fn test_batch_runs_with_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool = make_tool_dir(dir.path());
    std::fs::create_dir_all(tool.join("scripts")).expect("create scripts dir");
    std::fs::write(tool.join("scripts/run_dd_batch.py"), "# batch stub\n").expect("write script");
    std::fs::write(dir.path().join("dd_params.small.json"), "{}\n").expect("write config");
    std::fs::write(tool.join("b.csv"), "a,b\n").expect("write csv");
    std::fs::write(tool.join("a.csv"), "a,b\n").expect("write csv");
    std::fs::write(tool.join("c_uuid.csv"), "a,b\n").expect("write csv");

    let config = stub_config(dir.path(), "true");
    let out_dir = config.out_dir.clone();
    let rc = BandSuite::new(config).run().await.expect("run failed");

    assert_eq!(rc, 0);
    let log = std::fs::read_to_string(out_dir.join("run_dd_batch.log")).expect("read log");
    let header = log.lines().next().expect("header line");
    assert!(header.contains("--config"));
    assert!(header.contains("a.csv"));
    assert!(header.contains("b.csv"));
    assert!(!header.contains("c_uuid.csv"));
    let a_pos = header.find("a.csv").expect("a.csv in header");
    let b_pos = header.find("b.csv").expect("b.csv in header");
    assert!(a_pos < b_pos, "candidates must be passed in sorted order");
}

/// Test: a failing batch step aborts with its exit code.
#[tokio::test]
async fn test_batch_failure_aborts_with_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tool = make_tool_dir(dir.path());
    std::fs::create_dir_all(tool.join("scripts")).expect("create scripts dir");
    std::fs::write(tool.join("scripts/run_dd_batch.py"), "# batch stub\n").expect("write script");
    std::fs::write(dir.path().join("dd_params.small.json"), "{}\n").expect("write config");
    std::fs::write(tool.join("data.csv"), "a,b\n").expect("write csv");

    // Shell stub: succeed for every step except the batch script.
    let stub = dir.path().join("interp.sh");
    std::fs::write(
        &stub,
        "#!/bin/sh\ncase \"$*\" in *run_dd_batch.py*) exit 7 ;; *) exit 0 ;; esac\n",
    )
    .expect("write stub");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755))
            .expect("chmod stub");
    }

    let config = stub_config(dir.path(), stub.to_str().expect("utf8 path"));
    let out_dir = config.out_dir.clone();
    let rc = BandSuite::new(config).run().await.expect("run failed");

    assert_eq!(rc, 7, "suite must surface the batch step's exit code");
    assert!(out_dir.join("run_dd_batch.log").exists());
}

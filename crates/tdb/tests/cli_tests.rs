use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

/// A `tdb` command that never reads the user's configuration
fn tdb(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tdb").unwrap();
    cmd.env("TDB_CONFIG", dir.join("tdb.toml")).env_remove("RUST_LOG");
    cmd
}

fn write_sample(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(format!("{name}.json"));
    tdb(dir.path()).args(["demo", name, "-o"]).arg(&path).assert().success();
    path
}

#[test]
fn test_help_command() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Testing CLI help command");
    let dir = TempDir::new().unwrap();
    tdb(dir.path()).arg("--help").assert().success().stdout(predicate::str::contains("Trace Debugger"));
}

#[test]
fn test_version_command() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    tdb(dir.path()).arg("--version").assert().success().stdout(predicate::str::contains("tdb"));
}

#[test]
fn test_demo_prints_json() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    tdb(dir.path())
        .args(["demo", "hello-world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"op\": \"enter\"").and(predicate::str::contains("int main()")));
}

#[test]
fn test_demo_unknown_sample() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    tdb(dir.path())
        .args(["demo", "nonexistent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sample 'nonexistent'"));
}

#[test]
fn test_info_and_dump() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    let trace = write_sample(&dir, "functions");

    tdb(dir.path())
        .arg("info")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("Functions: 3").and(predicate::str::contains("Valid: yes")));

    tdb(dir.path())
        .arg("dump")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("F1 = int fnA()").and(predicate::str::contains("line 9")));
}

#[test]
fn test_replay_script() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    let trace = write_sample(&dir, "functions");

    tdb(dir.path())
        .arg("replay")
        .arg(&trace)
        .args(["--script", "s; s; s; s; bt; run"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("line 3 in int main() -> int fnA() -> int fnB()")
                .and(predicate::str::contains("locals: ##[fnB].result = 4"))
                .and(predicate::str::contains("#1 int fnA() at line 6"))
                .and(predicate::str::contains("globals: ##[main].result = 4")),
        );
}

#[test]
fn test_replay_breakpoint_flag_and_stdin() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    let trace = write_sample(&dir, "for-loop");

    tdb(dir.path())
        .arg("replay")
        .arg(&trace)
        .args(["--break", "5"])
        .write_stdin("breakpoints\nc\nc\nquit\nstep\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Breakpoints: 5")
                .and(predicate::str::contains("locals: ##val = 0, ##x = 1"))
                .and(predicate::str::contains("locals: ##val = 1, ##x = 2"))
                .and(predicate::str::contains("Trace completed").not()),
        );
}

#[test]
fn test_replay_rejects_malformed_trace() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    let trace = dir.path().join("broken.json");
    std::fs::write(
        &trace,
        r#"{"functions":[{"name":"int main()","return_slot_count":0}],"slots":[],"events":[{"op":"enter","function":0,"line":1}]}"#,
    )
    .unwrap();

    tdb(dir.path())
        .arg("info")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid: no"));

    tdb(dir.path())
        .arg("replay")
        .arg(&trace)
        .args(["--script", "s"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to replay malformed trace"));
}

#[test]
fn test_replay_missing_file() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    tdb(dir.path())
        .args(["replay", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open trace file"));
}

#[test]
fn test_config_init_and_print() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();

    tdb(dir.path())
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(dir.path().join("tdb.toml").exists());

    tdb(dir.path())
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    tdb(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("dirty_marker = \"##\"").and(predicate::str::contains("auto_validate = true")));
}

#[test]
fn test_config_breakpoints_apply_to_replay() {
    tdb_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = TempDir::new().unwrap();
    let trace = write_sample(&dir, "functions");
    std::fs::write(dir.path().join("tdb.toml"), "[replay]\nbreakpoints = [3]\n").unwrap();

    tdb(dir.path())
        .arg("replay")
        .arg(&trace)
        .args(["--script", "run; where"])
        .assert()
        .success()
        .stdout(predicate::str::contains("line 3 in int main() -> int fnA() -> int fnB()"));
}

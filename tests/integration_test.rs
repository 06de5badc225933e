//! Integration tests for the pcg CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn pcg() -> Command {
    let mut cmd = Command::cargo_bin("pcg").expect("binary built");
    cmd.env_remove("PCG_SKIP").env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(path, content).expect("write file");
}

/// Creates a PHP-style project whose test command is `test_command`.
fn create_project(test_command: &str) -> TempDir {
    let temp = TempDir::new().expect("create temp dir");
    let config = format!(
        r#"
[environment]
check = false

[tests]
command = "{test_command}"
"#
    );
    write(temp.path(), "precommit-gate.toml", &config);
    write(temp.path(), "phpunit.xml", "<phpunit/>");
    temp
}

/// Creates a test git repository.
fn create_test_repo() -> TempDir {
    let temp = TempDir::new().expect("create temp dir");

    std::process::Command::new("git")
        .args(["init", "--quiet"])
        .current_dir(temp.path())
        .output()
        .expect("init repo");

    temp
}

#[test]
fn test_help() {
    pcg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scans your project"));
}

#[test]
fn test_version() {
    pcg()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// run
// =============================================================================

#[test]
fn test_run_reports_findings_and_passes() {
    let temp = create_project("true");
    write(temp.path(), "src/a.php", "foo dd(bar)");
    write(temp.path(), "lib/x.php", "<<<<<<< HEAD\n");

    pcg()
        .args(["--color", "never", "run", "--yes"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 project files"))
        .stdout(predicate::str::contains("Warning: dd() found in"))
        .stdout(predicate::str::contains("Error: git conflict found in"))
        .stdout(predicate::str::contains("Tests Passed."));
}

#[test]
fn test_run_failing_tests_abort_commit() {
    let temp = create_project("echo '3 failures' && exit 1");
    write(temp.path(), "src/a.php", "<?php echo 1;");

    pcg()
        .args(["--color", "never", "run", "--yes"])
        .current_dir(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("with message:"))
        .stdout(predicate::str::contains("3 failures"));
}

#[test]
fn test_run_without_tests() {
    let temp = create_project("exit 1");

    pcg()
        .args(["run", "--no-tests"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 project files"))
        .stdout(predicate::str::contains("Running Tests").not());
}

#[test]
fn test_run_skips_without_test_config() {
    let temp = create_project("exit 1");
    std::fs::remove_file(temp.path().join("phpunit.xml")).expect("remove phpunit.xml");

    pcg()
        .args(["run", "--yes"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Would you like").not());
}

#[test]
fn test_run_excludes_vendor() {
    let temp = create_project("true");
    write(temp.path(), "vendor/pkg/deep/file.php", "<<<<<<< HEAD");

    pcg()
        .args(["run", "--no-tests"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 project files"))
        .stdout(predicate::str::contains("git conflict").not());
}

#[test]
fn test_run_root_override() {
    let temp = create_project("true");
    write(temp.path(), "app/src/a.php", "x dd(1)");
    write(temp.path(), "other.php", "x dd(2)");

    pcg()
        .args(["run", "--no-tests", "--root", "app"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 project files"));
}

#[test]
fn test_skip_env() {
    let temp = create_project("exit 1");

    pcg()
        .args(["run", "--yes"])
        .env("PCG_SKIP", "1")
        .current_dir(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("PCG_SKIP=1"));
}

#[test]
fn test_invalid_config_exits_with_config_error() {
    let temp = TempDir::new().expect("create temp dir");
    write(
        temp.path(),
        "precommit-gate.toml",
        "[[rules]]\nlabel = \"empty\"\npatterns = []\nseverity = \"warning\"\n",
    );

    pcg()
        .arg("run")
        .current_dir(temp.path())
        .assert()
        .code(78)
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_missing_root_exits_with_io_error() {
    let temp = create_project("true");

    pcg()
        .args(["run", "--no-tests", "--root", "missing"])
        .current_dir(temp.path())
        .assert()
        .code(74)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_missing_root_fails_with_environment_check_enabled() {
    let temp = TempDir::new().expect("create temp dir");
    write(
        temp.path(),
        "precommit-gate.toml",
        "[environment]\ncheck = true\ntool = \"sh\"\nmin_version = \"0.1\"\n",
    );

    pcg()
        .args(["run", "--yes", "--root", "typo"])
        .current_dir(temp.path())
        .assert()
        .code(74)
        .stdout(predicate::str::contains("skipping pre-commit checks").not())
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_parse_error_shows_toml_detail() {
    let temp = TempDir::new().expect("create temp dir");
    write(
        temp.path(),
        "precommit-gate.toml",
        "[[rules]]\nlabel = \"x\"\npatterns = [\"y\"]\n",
    );

    pcg()
        .arg("run")
        .current_dir(temp.path())
        .assert()
        .code(78)
        .stderr(predicate::str::contains("Failed to parse TOML"))
        .stderr(predicate::str::contains("severity"));
}

// =============================================================================
// scan
// =============================================================================

#[test]
fn test_scan_json() {
    let temp = create_project("true");
    write(temp.path(), "src/a.php", "foo dd(bar)");

    let output = pcg()
        .args(["scan", "--json"])
        .current_dir(temp.path())
        .output()
        .expect("run scan");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["files"], 1);
    assert_eq!(report["findings"][0]["rule"], "dd()");
    assert_eq!(report["findings"][0]["severity"], "warning");
}

#[test]
fn test_scan_blocks_on_error_when_configured() {
    let temp = TempDir::new().expect("create temp dir");
    write(
        temp.path(),
        "precommit-gate.toml",
        "[environment]\ncheck = false\n\n[policy]\nblock_on_error = true\n",
    );
    write(temp.path(), "lib/x.php", "<<<<<<< HEAD\n");

    pcg()
        .arg("scan")
        .current_dir(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("git conflict"));
}

// =============================================================================
// init / config
// =============================================================================

#[test]
fn test_init_creates_config() {
    let temp = TempDir::new().expect("create temp dir");

    pcg()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let content =
        std::fs::read_to_string(temp.path().join("precommit-gate.toml")).expect("read config");
    assert!(content.contains("phpunit"));
}

#[test]
fn test_init_with_preset() {
    let temp = TempDir::new().expect("create temp dir");

    pcg()
        .args(["init", "--preset", "rust"])
        .current_dir(temp.path())
        .assert()
        .success();

    let content =
        std::fs::read_to_string(temp.path().join("precommit-gate.toml")).expect("read config");
    assert!(content.contains("cargo test"));
}

#[test]
fn test_init_refuses_overwrite() {
    let temp = create_project("true");

    pcg()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    pcg()
        .args(["init", "--force"])
        .current_dir(temp.path())
        .assert()
        .success();
}

#[test]
fn test_config_raw() {
    let temp = create_project("true");

    pcg()
        .args(["config", "--raw"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("check = false"));
}

#[test]
fn test_completions() {
    pcg()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pcg"));
}

// =============================================================================
// install / uninstall
// =============================================================================

#[test]
fn test_install_and_uninstall() {
    let temp = create_test_repo();
    let hook = temp.path().join(".git/hooks/pre-commit");

    pcg()
        .arg("install")
        .current_dir(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Installed pre-commit hook"));
    assert!(hook.exists());

    pcg()
        .arg("install")
        .current_dir(temp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("already installed"));

    pcg()
        .arg("uninstall")
        .current_dir(temp.path())
        .assert()
        .success();
    assert!(!hook.exists());
}

#[test]
fn test_install_outside_repo() {
    let temp = TempDir::new().expect("create temp dir");

    pcg()
        .arg("install")
        .current_dir(temp.path())
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Not in a Git repository"));
}

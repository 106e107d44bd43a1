//! CLI integration tests: batch sync, rescan idempotence, listing.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tether() -> Command {
    Command::cargo_bin("tether").expect("tether binary")
}

fn write_source(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
}

fn write_batch(root: &Path, json: &str) -> std::path::PathBuf {
    let path = root.join("batch.json");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn sync_creates_artifact_then_skips_on_rerun() {
    let root = TempDir::new().unwrap();
    write_source(root.path(), "Scripts/Foo.src", "// tether:derive\nbody\n");
    let source = root.path().join("Scripts/Foo.src");
    let batch = write_batch(
        root.path(),
        &format!(r#"{{"created":[{}]}}"#, serde_json::to_string(&source).unwrap()),
    );

    tether()
        .args(["sync", "--root"])
        .arg(root.path())
        .arg("--batch")
        .arg(&batch)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 created"));
    assert!(root.path().join("Scripts/Foo.art").exists());

    tether()
        .args(["sync", "--root"])
        .arg(root.path())
        .arg("--batch")
        .arg(&batch)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 created"))
        .stdout(predicate::str::contains("1 skipped"));
}

#[test]
fn sync_reads_batch_from_stdin() {
    let root = TempDir::new().unwrap();
    write_source(root.path(), "Foo.src", "tether:derive");
    let source = root.path().join("Foo.src");

    tether()
        .args(["sync", "--root"])
        .arg(root.path())
        .write_stdin(format!(
            r#"{{"created":[{}]}}"#,
            serde_json::to_string(&source).unwrap()
        ))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 created"));
}

#[test]
fn sync_rejects_malformed_batch() {
    let root = TempDir::new().unwrap();
    let batch = write_batch(root.path(), r#"{"moved":["a"],"movedFrom":[]}"#);

    tether()
        .args(["sync", "--root"])
        .arg(root.path())
        .arg("--batch")
        .arg(&batch)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed batch"));
}

#[test]
fn non_marked_sources_are_skipped() {
    let root = TempDir::new().unwrap();
    write_source(root.path(), "Plain.src", "no marker here");

    tether()
        .args(["scan", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 created"));
    assert!(!root.path().join("Plain.art").exists());
}

#[test]
fn scan_then_list_shows_linked_artifact() {
    let root = TempDir::new().unwrap();
    write_source(root.path(), "Scripts/Hero.src", "tether:derive\n");

    tether()
        .args(["scan", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 created"));

    tether()
        .args(["list", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hero.art"))
        .stdout(predicate::str::contains("Hero"));
}

#[test]
fn json_report_is_machine_readable() {
    let root = TempDir::new().unwrap();
    write_source(root.path(), "Foo.src", "tether:derive");

    let output = tether()
        .args(["scan", "--json", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    let outcomes = report["outcomes"].as_array().expect("outcomes array");
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0]["action"], "created");
}

use assert_cmd::Command;
use predicates::prelude::*;

fn ytscribe() -> Command {
    Command::cargo_bin("ytscribe").unwrap()
}

#[test]
fn help_lists_subcommands() {
    ytscribe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn fetch_rejects_unusable_identifier_without_network() {
    ytscribe()
        .args(["fetch", "not a valid id", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid video identifier"));
}

#[test]
fn tracks_rejects_unsupported_host() {
    ytscribe()
        .args(["tracks", "https://vimeo.com/12345678901"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid video identifier"));
}

#[test]
fn config_show_prints_defaults() {
    ytscribe()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Configuration:"));
}

#[test]
fn fetch_rejects_unknown_format() {
    ytscribe()
        .args(["fetch", "iG9CE55wbtY", "--format", "docx"])
        .assert()
        .failure();
}

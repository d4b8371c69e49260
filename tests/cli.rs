use assert_cmd::Command;
use predicates::prelude::*;

fn vodprep() -> Command {
    Command::cargo_bin("vodprep").unwrap()
}

#[test]
fn help_lists_both_subcommands() {
    vodprep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn version_flag_works() {
    vodprep()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vodprep"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    vodprep().arg("transmogrify").assert().failure();
}

#[test]
fn convert_requires_an_input() {
    vodprep()
        .arg("convert")
        .assert()
        .failure()
        .stderr(predicate::str::contains("URL_OR_FILE"));
}

#[test]
fn info_rejects_a_malformed_url() {
    vodprep()
        .args(["info", "not-a-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL format"));
}

#[test]
fn info_rejects_non_http_schemes() {
    vodprep()
        .args(["info", "ftp://example.com/video.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP or HTTPS"));
}

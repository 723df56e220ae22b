use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("sage")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("key"))
        .stdout(predicate::str::contains("repos"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_login_help_shows_flags() {
    cargo_bin_cmd!("sage")
        .args(["login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("redirect-url"))
        .stdout(predicate::str::contains("no-browser"));
}

#[test]
fn test_key_help_shows_generate_flag() {
    cargo_bin_cmd!("sage")
        .args(["key", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("sage")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.2"));
}

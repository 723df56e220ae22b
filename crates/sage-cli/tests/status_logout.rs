//! Offline tests for `sage status` and `sage logout`.
//!
//! Both commands work from the local credentials cache; SAGE_BLOCK_REAL_API
//! guards against any accidental network use.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

const ACCESS_TOKEN: &str = "access-token-abcdef-123456";

fn write_credentials(home: &Path) {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let session = serde_json::json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "refresh-token-1",
        "expires_at": now + 3600,
        "identity": {
            "user_id": "user-1",
            "email": "dev@example.com",
            "metadata": { "user_name": "octocat" },
        },
    });
    fs::write(
        home.join("credentials.json"),
        serde_json::to_string_pretty(&session).unwrap(),
    )
    .unwrap();
}

#[test]
fn test_status_signed_out() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sage")
        .env("SAGE_HOME", dir.path())
        .env("SAGE_BLOCK_REAL_API", "1")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"))
        .stdout(predicate::str::contains("sage login"));
}

#[test]
fn test_status_shows_masked_token_only() {
    let dir = tempdir().unwrap();
    write_credentials(dir.path());

    cargo_bin_cmd!("sage")
        .env("SAGE_HOME", dir.path())
        .env("SAGE_BLOCK_REAL_API", "1")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as octocat."))
        .stdout(predicate::str::contains("dev@example.com"))
        .stdout(predicate::str::contains("access-token..."))
        .stdout(predicate::str::contains(ACCESS_TOKEN).not());
}

#[test]
fn test_logout_clears_cached_session() {
    let dir = tempdir().unwrap();
    write_credentials(dir.path());
    let credentials_path = dir.path().join("credentials.json");
    assert!(credentials_path.exists());

    // The identity service is unconfigured, so revocation is skipped and
    // only the local session is cleared.
    cargo_bin_cmd!("sage")
        .env("SAGE_HOME", dir.path())
        .env("SAGE_BLOCK_REAL_API", "1")
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    assert!(!credentials_path.exists());
}

#[test]
fn test_logout_without_session_still_succeeds() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sage")
        .env("SAGE_HOME", dir.path())
        .env("SAGE_BLOCK_REAL_API", "1")
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));
}

#[test]
fn test_key_requires_sign_in() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[identity]\nbase_url = \"http://127.0.0.1:1\"\nanon_key = \"anon\"\n\
         [api]\nbase_url = \"http://127.0.0.1:1\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("sage")
        .env("SAGE_HOME", dir.path())
        .env("SAGE_BLOCK_REAL_API", "1")
        .arg("key")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

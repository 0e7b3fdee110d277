use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn haulboard(dir: &Path, args: &[&str]) -> Output {
    Command::new(PathBuf::from(env!("CARGO_BIN_EXE_haulboard")))
        .env("HAULBOARD_DIR", dir)
        .env_remove("HAULBOARD_TOKEN")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn version_reports_binary_name() {
    let dir = TempDir::new().unwrap();
    let output = haulboard(dir.path(), &["version"]);

    assert!(output.status.success());
    assert!(stdout(&output).starts_with("haulboard "));
}

#[test]
fn blank_search_never_contacts_backend() {
    let dir = TempDir::new().unwrap();
    // Unroutable backend: any request would fail the command.
    std::fs::write(
        dir.path().join("config.toml"),
        "[api]\nbase_url = \"http://127.0.0.1:9/api\"\ntimeout_ms = 500\n",
    )
    .unwrap();

    let output = haulboard(dir.path(), &["search", "   "]);

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output).trim(), "No query");
}

#[test]
fn unreachable_backend_reports_fallback_message() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[api]\nbase_url = \"http://127.0.0.1:9/api\"\ntimeout_ms = 500\n",
    )
    .unwrap();

    let output = haulboard(dir.path(), &["search", "acme"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unable to complete search. Please try again."),
        "{stderr}"
    );
}

#[test]
fn config_init_writes_defaults_once() {
    let dir = TempDir::new().unwrap();

    let output = haulboard(dir.path(), &["config", "path"]);
    assert_eq!(
        stdout(&output).trim(),
        dir.path().join("config.toml").display().to_string()
    );

    let output = haulboard(dir.path(), &["config", "init"]);
    assert!(output.status.success());
    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("debounce_ms = 300"));

    let output = haulboard(dir.path(), &["config", "init"]);
    assert!(!output.status.success(), "second init should refuse");

    let output = haulboard(dir.path(), &["config", "init", "--force"]);
    assert!(output.status.success());
}

#[test]
fn session_login_logout_round_trip() {
    let dir = TempDir::new().unwrap();

    let output = haulboard(dir.path(), &["session", "show"]);
    assert!(stdout(&output).contains("Token:   none"));

    let output = haulboard(dir.path(), &["session", "login", "tok-abc"]);
    assert!(output.status.success());
    assert!(dir.path().join("session.json").exists());

    let output = haulboard(dir.path(), &["session", "show"]);
    assert!(stdout(&output).contains("Token:   present"));
    assert!(!stdout(&output).contains("tok-abc"));

    let output = haulboard(dir.path(), &["session", "logout"]);
    assert!(stdout(&output).contains("Saved token removed"));
    assert!(!dir.path().join("session.json").exists());
}

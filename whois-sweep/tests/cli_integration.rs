// whois-sweep/tests/cli_integration.rs

//! CLI tests. None of them needs network access: they exercise argument
//! validation, configuration loading and the local TLD table, or point
//! checks at a closed port on 127.0.0.1.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config files and environment.
fn whois_sweep(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("whois-sweep").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("WS_CONFIG")
        .env_remove("WS_TLD")
        .env_remove("WS_WINDOW_SIZE")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to write a config file into the isolated home
fn write_config(home: &TempDir, name: &str, content: &str) -> String {
    let path = home.path().join(name);
    fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().into_owned()
}

/// A TLD whose WHOIS server is a closed local port: every check fails fast.
const LOCAL_TLD_CONFIG: &str = r#"
[check]
pacing = "0ms"
connect_timeout = "2s"
idle_timeout = "200ms"

[[tlds]]
name = "test"
server = "127.0.0.1"
available_pattern = "No match for"
"#;

#[test]
fn test_help_shows_flags() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--tld"))
        .stdout(predicate::str::contains("--all"))
        .stdout(predicate::str::contains("--window"))
        .stdout(predicate::str::contains("--pacing-ms"))
        .stdout(predicate::str::contains("--deadline"))
        .stdout(predicate::str::contains("--retry"))
        .stdout(predicate::str::contains("--list-tlds"))
        .stdout(predicate::str::contains("--discover"));
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_keywords_error() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one keyword"));
}

#[test]
fn test_invalid_keyword_error() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .args(["good", "bad_keyword"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid domain 'bad_keyword'"));

    whois_sweep(&home)
        .arg("example.com")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--tld"));
}

#[test]
fn test_conflicting_output_formats() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .args(["test", "--json", "--csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("multiple output formats"));
}

#[test]
fn test_conflicting_tld_sources() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .args(["test", "--all", "-t", "com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("-t/--tld and --all"));
}

#[test]
fn test_window_and_deadline_validation() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .args(["test", "--window", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Window size"));

    whois_sweep(&home)
        .args(["test", "--deadline", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Deadline"));
}

#[test]
fn test_keyword_cap_requires_force() {
    let home = TempDir::new().unwrap();
    let keywords: Vec<String> = (0..11).map(|i| format!("kw{}", i)).collect();

    whois_sweep(&home)
        .args(&keywords)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Too many keywords"))
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_tld_cap_requires_force() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .args(["test", "-t", "a,b,c,d,e,f,g,h,i,j,k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Too many TLDs"));
}

#[test]
fn test_tld_cap_applies_to_ws_tld() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .env("WS_TLD", "a,b,c,d,e,f,g,h,i,j,k")
        .arg("test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Too many TLDs (11)"));
}

#[test]
fn test_unknown_tlds_fail_the_run() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .args(["test", "-t", "notarealtld,zz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid TLDs among: notarealtld, zz"));
}

#[test]
fn test_disabled_tld_is_not_valid() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .args(["test", "-t", "es"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No valid TLDs"));
}

#[test]
fn test_list_tlds() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .arg("--list-tlds")
        .assert()
        .success()
        .stdout(predicate::str::contains(".com"))
        .stdout(predicate::str::contains("whois.verisign-grs.com"))
        .stdout(predicate::str::contains("No match for"))
        .stdout(predicate::str::contains("(disabled)"));
}

#[test]
fn test_list_tlds_with_config_overrides() {
    let home = TempDir::new().unwrap();
    let config = write_config(
        &home,
        "custom.toml",
        r#"
[[tlds]]
name = "com"
server = "whois.example.test"
available_pattern = "No match for"

[[tlds]]
name = "rs"
server = "whois.rnids.rs"
available_pattern = "%ERROR:103: Domain is not registered"
"#,
    );

    whois_sweep(&home)
        .args(["--list-tlds", "--config", &config])
        .assert()
        .success()
        .stdout(predicate::str::contains("whois.example.test"))
        .stdout(predicate::str::contains("whois.rnids.rs"))
        .stdout(predicate::str::contains("Known TLDs"));
}

#[test]
fn test_local_config_is_discovered() {
    let home = TempDir::new().unwrap();
    write_config(
        &home,
        "whois-sweep.toml",
        "[[tlds]]\nname = \"zz\"\nserver = \"whois.zz.test\"\navailable_pattern = \"free\"\n",
    );

    whois_sweep(&home)
        .arg("--list-tlds")
        .assert()
        .success()
        .stdout(predicate::str::contains("whois.zz.test"));
}

#[test]
fn test_invalid_config_file_error() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home, "bad.toml", "[check]\nwindow_size = 0\n");

    whois_sweep(&home)
        .args(["test", "--config", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_ws_config_missing_file_error() {
    let home = TempDir::new().unwrap();
    whois_sweep(&home)
        .env("WS_CONFIG", home.path().join("missing.toml"))
        .arg("test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_unreachable_server_reported_in_json() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home, "local.toml", LOCAL_TLD_CONFIG);

    whois_sweep(&home)
        .args(["alpha", "beta", "-t", "test", "--json", "--config", &config])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"domain\": \"alpha.test\""))
        .stdout(predicate::str::contains("\"domain\": \"beta.test\""))
        .stdout(predicate::str::contains("\"available\": false"))
        .stdout(predicate::str::contains("\"error\""));
}

#[test]
fn test_unreachable_server_reported_in_csv() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home, "local.toml", LOCAL_TLD_CONFIG);

    whois_sweep(&home)
        .env("WS_TLD", "test")
        .args(["alpha", "--csv", "--config", &config])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("domain,tld,available,timestamp,error"))
        .stdout(predicate::str::contains("alpha.test,test,false,"));
}

#[test]
fn test_text_output_summarizes_failures() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home, "local.toml", LOCAL_TLD_CONFIG);

    whois_sweep(&home)
        .args(["alpha", "beta", "-t", "test", "--config", &config])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha.test"))
        .stdout(predicate::str::contains("could not be checked"))
        .stdout(predicate::str::contains("Some domains could not be checked"));
}

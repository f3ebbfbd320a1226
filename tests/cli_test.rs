//! CLI integration tests.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const OPT_JSON: &str = r#"{
    "object": "card", "id": "c-opt", "name": "Opt", "set": "xln",
    "collector_number": "65", "lang": "en", "mana_cost": "{U}",
    "image_uris": {"normal": "https://img.example/opt-normal.jpg"}
}"#;

const CATALOG: &str = r#"{"object":"list","has_more":false,"data":[
    {"symbol":"{T}","english":"tap this permanent","svg_uri":"https://svgs.example/T.svg"},
    {"symbol":"{Q}","english":"untap this permanent","svg_uri":"https://svgs.example/Q.svg"}
]}"#;

fn cardsync(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("cardsync"));
    cmd.current_dir(temp.path())
        .env_remove("RUST_LOG")
        .env_remove("CARDSYNC_STORE_DIR")
        .arg("--store-dir")
        .arg(temp.path().join("store"));
    cmd
}

fn write_config(temp: &TempDir, server: &MockServer) -> PathBuf {
    let path = temp.path().join("cardsync.yml");
    fs::write(
        &path,
        format!("remote:\n  base_url: {}\n  timeout: 5s\n", server.base_url()),
    )
    .unwrap();
    path
}

#[test]
fn help_describes_the_tool() {
    let mut cmd = Command::new(cargo_bin("cardsync"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("card data"))
        .stdout(predicate::str::contains("locate"));
}

#[test]
fn version_prints_package_version() {
    let mut cmd = Command::new(cargo_bin("cardsync"));
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn stats_on_empty_store() {
    let temp = TempDir::new().unwrap();
    cardsync(&temp)
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cards: 0"));
}

#[test]
fn locate_fetches_then_serves_locally() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/cards/xln/65");
        then.status(200).body(OPT_JSON);
    });
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, &server);

    for _ in 0..2 {
        cardsync(&temp)
            .arg("--config")
            .arg(&config)
            .args(["locate", "--set", "XLN", "--number", "65", "--image", "normal"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Opt {U}"))
            .stdout(predicate::str::contains("https://img.example/opt-normal.jpg"));
    }

    mock.assert_calls(1);
}

#[test]
fn locate_unknown_card_exits_with_two() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/cards/nope");
        then.status(404).body(r#"{"object":"error","status":404}"#);
    });
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, &server);

    cardsync(&temp)
        .arg("--config")
        .arg(&config)
        .args(["locate", "--id", "nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No card matches"));
}

#[test]
fn locate_without_usable_filters_fails() {
    let temp = TempDir::new().unwrap();
    cardsync(&temp)
        .args(["locate", "--lang", "ja"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No search scheme matches"));
}

#[test]
fn symbols_sync_then_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/symbology");
        then.status(200).body(CATALOG);
    });
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, &server);

    cardsync(&temp)
        .arg("--config")
        .arg(&config)
        .args(["symbols", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 added, 0 updated, 0 deleted"));

    cardsync(&temp)
        .arg("--config")
        .arg(&config)
        .args(["symbols", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Symbols are up to date"));

    cardsync(&temp)
        .args(["cache", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("untap this permanent"));
}

#[test]
fn symbols_dry_run_writes_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/symbology");
        then.status(200).body(CATALOG);
    });
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, &server);

    cardsync(&temp)
        .arg("--config")
        .arg(&config)
        .args(["symbols", "sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: 2 to add"));

    cardsync(&temp)
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Symbols: 0"));
}

#[test]
fn clear_with_force_empties_store() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/symbology");
        then.status(200).body(CATALOG);
    });
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, &server);

    cardsync(&temp)
        .arg("--config")
        .arg(&config)
        .args(["symbols", "sync"])
        .assert()
        .success();

    cardsync(&temp)
        .args(["cache", "clear", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 records"));
}

#[test]
fn project_config_is_discovered() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join(".cardsync")).unwrap();
    fs::write(
        temp.path().join(".cardsync/config.yml"),
        "cache:\n  attachment_ttl: soon\n",
    )
    .unwrap();

    cardsync(&temp)
        .args(["cache", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("attachment_ttl"));
}

#[test]
fn missing_config_file_fails() {
    let temp = TempDir::new().unwrap();
    cardsync(&temp)
        .args(["--config", "nowhere.yml", "cache", "stats"])
        .assert()
        .failure();
}

#[test]
fn completions_for_bash() {
    let mut cmd = Command::new(cargo_bin("cardsync"));
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cardsync"));
}

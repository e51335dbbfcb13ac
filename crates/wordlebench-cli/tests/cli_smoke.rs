use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn wordlebench(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wordlebench").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("WORDLEBENCH_DB")
        .env_remove("WORDLEBENCH_PARALLEL")
        .env_remove("WORDLEBENCH_LOG");
    cmd
}

#[test]
fn test_version_prints_crate_version() {
    let dir = TempDir::new().unwrap();
    wordlebench(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_scaffolds_once() {
    let dir = TempDir::new().unwrap();
    wordlebench(&dir)
        .arg("init")
        .assert()
        .success()
        .stderr(contains("created wordlebench.yaml"));

    for f in [
        "wordlebench.yaml",
        "prompts/system_prompt.md",
        "prompts/user_prompt.md",
        "words.txt",
    ] {
        assert!(dir.path().join(f).exists(), "{f} missing");
    }

    wordlebench(&dir)
        .arg("init")
        .assert()
        .success()
        .stderr(contains("already exists"));
}

#[test]
fn test_plan_lists_every_pair_on_fresh_db() {
    let dir = TempDir::new().unwrap();
    wordlebench(&dir).arg("init").assert().success();

    wordlebench(&dir)
        .args(["plan", "--model", "openai/gpt-5-mini"])
        .assert()
        .success()
        .stdout(contains("openai/gpt-5-mini\tCRANE"))
        .stderr(contains("pending=5 skipped=0"));

    assert!(dir.path().join("games.db").exists());
}

#[test]
fn test_run_without_api_key_is_config_error() {
    let dir = TempDir::new().unwrap();
    wordlebench(&dir).arg("init").assert().success();
    fs::write(
        dir.path().join("wordlebench.yaml"),
        "models: [m]\nprovider:\n  api_key_env: WORDLEBENCH_TEST_UNSET_KEY\n",
    )
    .unwrap();

    wordlebench(&dir)
        .env_remove("WORDLEBENCH_TEST_UNSET_KEY")
        .arg("run")
        .assert()
        .code(2)
        .stderr(contains("WORDLEBENCH_TEST_UNSET_KEY"));
}

#[test]
fn test_strict_run_rejects_unknown_keys() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("wordlebench.yaml"), "models: [m]\nretries: 3\n").unwrap();

    wordlebench(&dir)
        .args(["run", "--strict"])
        .assert()
        .code(2)
        .stderr(contains("retries"));
}

#[test]
fn test_report_on_missing_db_fails() {
    let dir = TempDir::new().unwrap();
    wordlebench(&dir)
        .args(["report", "--db", "nope.db"])
        .assert()
        .code(2)
        .stderr(contains("does not exist"));
}

#[test]
fn test_report_and_games_on_empty_db() {
    let dir = TempDir::new().unwrap();
    wordlebench(&dir).arg("init").assert().success();
    wordlebench(&dir).arg("plan").assert().success();

    wordlebench(&dir)
        .args(["report", "--out", "site/results.json"])
        .assert()
        .success();
    let raw = fs::read_to_string(dir.path().join("site/results.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["total_games"], 0);
    assert!(doc["models"].as_array().unwrap().is_empty());
    assert!(doc["generated_at"].as_str().unwrap().ends_with('Z'));

    wordlebench(&dir)
        .args(["games", "list"])
        .assert()
        .success()
        .stdout(contains("model"))
        .stderr(contains("page 1/1 (0 games)"));

    wordlebench(&dir)
        .args(["games", "show", "42"])
        .assert()
        .code(1)
        .stderr(contains("no game with id 42"));

    wordlebench(&dir)
        .args(["games", "list", "--sort-by", "bogus"])
        .assert()
        .code(2);
}

#[test]
fn test_read_commands_use_db_next_to_config() {
    let dir = TempDir::new().unwrap();
    let config = "bench/wordlebench.yaml";
    wordlebench(&dir).args(["init", "--config", config]).assert().success();
    wordlebench(&dir)
        .args(["plan", "--config", config])
        .assert()
        .success();
    assert!(dir.path().join("bench/games.db").exists());
    assert!(!dir.path().join("games.db").exists());

    wordlebench(&dir)
        .args(["report", "--config", config, "--out", "results.json"])
        .assert()
        .success();
    wordlebench(&dir)
        .args(["games", "list", "--config", config])
        .assert()
        .success()
        .stderr(contains("(0 games)"));
}

#[test]
fn test_dotenv_file_sets_environment() {
    let dir = TempDir::new().unwrap();
    wordlebench(&dir).arg("init").assert().success();
    fs::write(dir.path().join(".env"), "WORDLEBENCH_DB=from_dotenv.db\n").unwrap();

    wordlebench(&dir).arg("plan").assert().success();
    assert!(dir.path().join("from_dotenv.db").exists());
    assert!(!dir.path().join("games.db").exists());
}

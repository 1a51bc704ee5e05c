use std::path::Path;
use std::process::{Command, Output};

const ENV_KEYS: &[&str] = &[
    "DB_USERNAME",
    "DB_PASSWORD",
    "DB_HOST",
    "DB_PORT",
    "DB_DATABASE",
    "SCHED_CONFIG_PATH",
    "SCHED_LOG_LEVEL",
    "SCHED_LOG_JSON",
];

/// Runs the built binary in `cwd` with a clean scheduler environment.
fn run_binary(cwd: &Path, config_path: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sched-app"));
    cmd.arg(config_path).current_dir(cwd);
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd.output().expect("failed to spawn sched-app")
}

const ONE_SEED: &str = r#"
[query]
window_days = 7

[[seed]]
client_name = "John Doe"
description = "Meeting with client"
offset_days = 7
confirmed = true
"#;

#[test]
fn malformed_config_exits_with_code_one_and_empty_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[database\nport = ").unwrap();

    let output = run_binary(dir.path(), &config);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "stdout: {:?}", output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error loading configuration"), "stderr: {stderr}");
}

#[test]
fn unopenable_database_exits_with_code_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let db = dir.path().join("missing").join("appointments.db");
    std::fs::write(
        &config,
        format!(
            "[database]\ndatabase = {:?}\npool_max_size = 1\nconnect_timeout_ms = 200\n{ONE_SEED}",
            db.to_str().unwrap()
        ),
    )
    .unwrap();

    let output = run_binary(dir.path(), &config);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn env_file_supplies_database_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, ONE_SEED).unwrap();

    let db = dir.path().join("from-env.db");
    std::fs::write(
        dir.path().join(".env"),
        format!("DB_DATABASE={}\nDB_USERNAME=app\n", db.to_str().unwrap()),
    )
    .unwrap();

    let output = run_binary(dir.path(), &config);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(db.exists(), "database opened at the path from .env");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Scheduled Appointments:");
    assert!(lines[1].starts_with("ID: 1 | Client: John Doe | "));
}

#[test]
fn missing_env_file_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let db = dir.path().join("appointments.db");
    std::fs::write(
        &config,
        format!("[database]\ndatabase = {:?}\n{ONE_SEED}", db.to_str().unwrap()),
    )
    .unwrap();

    let output = run_binary(dir.path(), &config);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8(output.stdout)
        .unwrap()
        .contains("Client: John Doe"));
}

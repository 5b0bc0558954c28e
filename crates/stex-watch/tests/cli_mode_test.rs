/*
[INPUT]:  stex-watch binary and sample configuration files
[OUTPUT]: Dry-run exit status verification
[POS]:    Integration test layer - CLI entry point
[UPDATE]: When CLI flags or config validation change
*/

use std::io::Write;
use std::process::Command;

fn run_dry(config_path: &str) -> std::process::Output {
    let binary_path = env!("CARGO_BIN_EXE_stex-watch");
    Command::new(binary_path)
        .arg("--config")
        .arg(config_path)
        .arg("--dry-run")
        .arg("--log-level")
        .arg("info")
        .env_remove("STEX_API_TOKEN")
        .output()
        .expect("Failed to start stex-watch binary")
}

#[test]
fn cli_mode_with_config_and_dry_run_works() {
    let config_path = format!("{}/examples/watch.yaml", env!("CARGO_MANIFEST_DIR"));
    let output = run_dry(&config_path);

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let logs = String::from_utf8_lossy(&output.stdout);
    assert!(logs.contains("sell_data702"), "channel names are logged: {logs}");
}

#[test]
fn cli_mode_rejects_incomplete_subscription() {
    let path = std::env::temp_dir().join(format!("stex-watch-bad-{}.yaml", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).expect("create temp config");
        writeln!(file, "subscriptions:\n  - kind: balance").expect("write temp config");
    }

    let output = run_dry(path.to_str().expect("utf-8 temp path"));
    let _ = std::fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("wallet_id is required"), "stderr: {stderr}");
}

#[test]
fn cli_mode_requires_config_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_stex-watch"))
        .arg("--dry-run")
        .output()
        .expect("Failed to start stex-watch binary");
    assert!(!output.status.success());
}

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

fn sitescore_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sitescore"));
    cmd.env("HOME", home);
    cmd.env_remove("SITESCORE_CONFIG");
    cmd.env_remove("SITESCORE_ENDPOINT_URL");
    cmd.env_remove("SITESCORE_ENDPOINT_TIMEOUT_SECS");
    cmd.env_remove("SITESCORE_UI_COLOR");
    cmd.env_remove("SITESCORE_UI_ANIMATE");
    cmd.env_remove("SITESCORE_LOGS_ENABLED");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    sitescore_cmd(home).args(args).output().expect("run sitescore")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);

    let temp = std::env::temp_dir();
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let uniq = format!("sitescore-config-test-{}-{seq}", std::process::id());
    let home = temp.join(uniq);
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdirs");
    }
    std::fs::write(path, bytes).expect("write");
}

fn show_config(out: &Output) -> serde_json::Value {
    assert!(
        out.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("parse json")
}

#[test]
fn defaults_without_config_file() {
    let home = make_temp_home();
    let v = show_config(&run(&home, &["--json", "config", "--show"]));
    assert_eq!(v["endpoint"]["url"], "http://127.0.0.1:5000/api/check");
    assert_eq!(v["endpoint"]["timeout_secs"], 30);
    assert_eq!(v["ui"]["animate"], true);
    assert_eq!(v["logs"]["enabled"], true);
    assert!(v.get("config_path").is_none());
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn config_file_overrides_defaults() {
    let home = make_temp_home();
    write_file(
        home.join(".config/sitescore/config.toml").as_path(),
        br#"
[endpoint]
url = "https://scan.internal.example/api/check"
timeout_secs = 12

[logs]
enabled = false
"#,
    );

    let v = show_config(&run(&home, &["--json", "config", "--show"]));
    assert_eq!(v["endpoint"]["url"], "https://scan.internal.example/api/check");
    assert_eq!(v["endpoint"]["timeout_secs"], 12);
    assert_eq!(v["ui"]["color"], true);
    assert_eq!(v["logs"]["enabled"], false);
    assert!(
        v["config_path"]
            .as_str()
            .is_some_and(|p| p.ends_with(".config/sitescore/config.toml"))
    );
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn cli_flags_override_config_file() {
    let home = make_temp_home();
    let cfg = home.join("custom.toml");
    write_file(
        cfg.as_path(),
        br#"
[endpoint]
url = "https://file.example/api/check"
timeout_secs = 12
"#,
    );

    let out = sitescore_cmd(&home)
        .arg("--config")
        .arg(&cfg)
        .args([
            "--endpoint",
            "https://flag.example/api/check",
            "--timeout",
            "4",
            "--json",
            "config",
            "--show",
        ])
        .output()
        .expect("run sitescore");
    let v = show_config(&out);
    assert_eq!(v["endpoint"]["url"], "https://flag.example/api/check");
    assert_eq!(v["endpoint"]["timeout_secs"], 4);
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn malformed_config_file_exits_2() {
    let home = make_temp_home();
    write_file(
        home.join(".config/sitescore/config.toml").as_path(),
        b"[endpoint\nurl = 1\n",
    );
    let out = run(&home, &["config", "--show"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn config_show_prints_toml_by_default() {
    let home = make_temp_home();
    let out = run(&home, &["config", "--show"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[endpoint]"), "stdout={stdout}");
    assert!(stdout.contains("timeout_secs = 30"), "stdout={stdout}");
    let _ = std::fs::remove_dir_all(&home);
}

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

fn base_cmd(home: &Path) -> Command {
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

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);

    let temp = std::env::temp_dir();
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let uniq = format!("sitescore-env-test-{}-{seq}", std::process::id());
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

#[test]
fn env_overrides_config_file() {
    let home = make_temp_home();
    write_file(
        home.join(".config/sitescore/config.toml").as_path(),
        br#"
[endpoint]
timeout_secs = 12

[ui]
animate = true
"#,
    );

    let out = {
        let mut cmd = base_cmd(&home);
        cmd.env("SITESCORE_ENDPOINT_TIMEOUT_SECS", "9");
        cmd.env("SITESCORE_UI_ANIMATE", "off");
        cmd.env("SITESCORE_ENDPOINT_URL", "https://env.example/api/check");
        cmd.args(["--json", "config", "--show"]);
        cmd.output().expect("run sitescore")
    };
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert_eq!(v["endpoint"]["timeout_secs"], 9);
    assert_eq!(v["endpoint"]["url"], "https://env.example/api/check");
    assert_eq!(v["ui"]["animate"], false);

    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn cli_flag_overrides_env() {
    let home = make_temp_home();
    let out = {
        let mut cmd = base_cmd(&home);
        cmd.env("SITESCORE_ENDPOINT_TIMEOUT_SECS", "9");
        cmd.args(["--timeout", "2", "--json", "config", "--show"]);
        cmd.output().expect("run sitescore")
    };
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert_eq!(v["endpoint"]["timeout_secs"], 2);
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn cli_config_path_overrides_env_config_path() {
    let home = make_temp_home();

    let cfg_env = home.join("env-config.toml");
    let cfg_cli = home.join("cli-config.toml");
    write_file(cfg_env.as_path(), b"[endpoint]\ntimeout_secs = 5\n");
    write_file(cfg_cli.as_path(), b"[endpoint]\ntimeout_secs = 6\n");

    let out = {
        let mut cmd = base_cmd(&home);
        cmd.env("SITESCORE_CONFIG", &cfg_env);
        cmd.arg("--config");
        cmd.arg(&cfg_cli);
        cmd.args(["--json", "config", "--show"]);
        cmd.output().expect("run sitescore")
    };
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert_eq!(v["endpoint"]["timeout_secs"], 6);

    let out = {
        let mut cmd = base_cmd(&home);
        cmd.env("SITESCORE_CONFIG", &cfg_env);
        cmd.args(["--json", "config", "--show"]);
        cmd.output().expect("run sitescore")
    };
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert_eq!(v["endpoint"]["timeout_secs"], 5);

    let _ = std::fs::remove_dir_all(&home);
}

#![allow(dead_code)]

use anyhow::{bail, Result};
use assert_cmd::cargo;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

const PRICEWATCH_VARS: &[&str] = &[
    "PRICEWATCH_CACHE_FILE",
    "PRICEWATCH_HTTP_TIMEOUT_SECS",
    "PRICEWATCH_SMTP_HOST",
    "PRICEWATCH_SMTP_PORT",
    "PRICEWATCH_MAIL_SENDER",
    "PRICEWATCH_MAIL_PASSWORD",
    "PRICEWATCH_MAIL_RECIPIENT",
];

pub fn cache_root_for_home(home: &TempDir) -> PathBuf {
    home.path().join(".cache")
}

pub fn config_root_for_home(home: &TempDir) -> PathBuf {
    home.path().join(".config")
}

pub fn default_cache_file(home: &TempDir) -> PathBuf {
    cache_root_for_home(home)
        .join("pricewatch")
        .join("last_prices.json")
}

/// Command isolated from the user's config, cache and mail credentials
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("pricewatch"));
    cmd.current_dir(home.path());
    cmd.env("HOME", home.path());
    cmd.env("XDG_CACHE_HOME", cache_root_for_home(home));
    cmd.env("XDG_CONFIG_HOME", config_root_for_home(home));
    for var in PRICEWATCH_VARS {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn");
    cmd.arg("--no-color");
    cmd
}

pub fn run_cmd(home: &TempDir, args: &[&str]) -> Result<Output> {
    let mut cmd = base_cmd(home);
    cmd.args(args);
    let output = cmd.output()?;
    if !output.status.success() {
        bail!(
            "command failed: {:?}\nstdout: {}\nstderr: {}",
            args,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

pub fn run_cmd_json(home: &TempDir, args: &[&str]) -> Result<Value> {
    let output = run_cmd(home, args)?;
    let stdout = String::from_utf8(output.stdout)?;
    Ok(serde_json::from_str(&stdout)?)
}

pub fn check_json(home: &TempDir, url: &str, mode: &str) -> Result<Value> {
    run_cmd_json(home, &["--json", "check", url, "--mode", mode])
}

pub fn cache_show_json(home: &TempDir) -> Result<Vec<Value>> {
    let value = run_cmd_json(home, &["--json", "cache", "show"])?;
    Ok(value.as_array().cloned().unwrap_or_default())
}

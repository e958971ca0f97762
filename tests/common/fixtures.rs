//! Test environment setup and predefined console scripts
//!
//! Provides a temporary config directory and helpers that build `barco`
//! invocations against it, so tests never read or write the real user config.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary workspace holding a config file. The TempDir must be kept alive
/// for the duration of the test to prevent cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
}

impl TestEnv {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A `barco` command pointed at this environment's config
    pub fn barco(&self) -> anyhow::Result<Command> {
        let mut cmd = Command::cargo_bin("barco")?;
        cmd.arg("--config")
            .arg(&self.config_path)
            .env("XDG_CONFIG_HOME", self.path())
            .env("NO_COLOR", "1")
            .current_dir(self.path());
        Ok(cmd)
    }

    /// Create a named pipe in the environment, standing in for a scanner tty
    #[cfg(unix)]
    pub fn make_fifo(&self, name: &str) -> anyhow::Result<PathBuf> {
        let path = self.path().join(name);
        let status = std::process::Command::new("mkfifo").arg(&path).status()?;
        anyhow::ensure!(status.success(), "mkfifo {} failed", path.display());
        Ok(path)
    }

    /// An offline session command ready for scripted stdin
    pub fn offline_session(&self) -> anyhow::Result<Command> {
        let mut cmd = self.barco()?;
        cmd.args(["session", "--offline"]);
        Ok(cmd)
    }
}

/// Sets up an environment with a dollar-denominated config
pub fn setup_test_env() -> anyhow::Result<TestEnv> {
    setup_test_env_with_config(
        r#"{
  "lookup": { "base_url": "http://127.0.0.1:9", "timeout_secs": 2, "workers": 1 },
  "receipt": { "store_name": "Test Mart", "title": "Invoice", "currency_symbol": "$" }
}"#,
    )
}

pub fn setup_test_env_with_config(config: &str) -> anyhow::Result<TestEnv> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.json");
    fs::write(&config_path, config)?;
    Ok(TestEnv {
        temp_dir,
        config_path,
    })
}

/// Join console lines into stdin text
pub fn script(lines: &[&str]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Scenario: one product scanned twice and priced by hand
pub fn juice_twice_script() -> String {
    script(&["0001", "0001", "price 0001 50", "receipt", "quit"])
}

/// Scenario: one priced product and one left without a price
pub fn mixed_pricing_script() -> String {
    script(&["0001", "price 0001 50", "0002", "receipt", "quit"])
}

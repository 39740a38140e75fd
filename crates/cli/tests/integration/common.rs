//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

pub const ADDRESS: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

/// Files copied into every test project.
const PROJECT_FIXTURES: &[&str] = &["subgraph.yaml", "schema.graphql", "Token.json", "MergeOnly.json"];

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated subgraph project.
///
/// Each test gets its own temporary directory holding a copy of the fixture
/// project; commands run with it as working directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    for name in PROJECT_FIXTURES {
      std::fs::write(temp.path().join(name), fixture_content(name)).unwrap();
    }
    Self { temp }
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  pub fn read(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path)).unwrap()
  }

  pub fn manifest(&self) -> serde_yaml::Value {
    serde_yaml::from_str(&self.read("subgraph.yaml")).unwrap()
  }

  pub fn networks(&self) -> serde_json::Value {
    serde_json::from_str(&self.read("networks.json")).unwrap()
  }

  /// `grafter add <ADDRESS> --abi Token.json --contract-name Token --skip-codegen`
  /// plus `extra`, run in the project directory.
  pub fn add(&self, extra: &[&str]) -> Command {
    let mut cmd = self.grafter();
    cmd
      .args(["add", ADDRESS, "--abi", "Token.json", "--contract-name", "Token", "--skip-codegen"])
      .args(extra);
    cmd
  }

  /// The grafter binary with the project as working directory.
  pub fn grafter(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("grafter");
    cmd.current_dir(self.temp.path()).env_remove("RUST_LOG");
    cmd
  }
}

//! Package manager detection and the `codegen` script.

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CodegenError {
  #[error("neither yarn nor npm found in PATH, install one of them to run code generation")]
  NoPackageManager,

  #[error("failed to start {program}: {source}")]
  Spawn { program: String, source: io::Error },

  #[error("`{command}` failed{}", .code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
  Failed { command: String, code: Option<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManagerKind {
  Yarn,
  Npm,
}

impl PackageManagerKind {
  /// Lookup order when detecting.
  pub const ALL: [PackageManagerKind; 2] = [PackageManagerKind::Yarn, PackageManagerKind::Npm];

  pub fn program(self) -> &'static str {
    match self {
      PackageManagerKind::Yarn => "yarn",
      PackageManagerKind::Npm => "npm",
    }
  }

  pub fn codegen_args(self) -> &'static [&'static str] {
    match self {
      PackageManagerKind::Yarn => &["codegen"],
      PackageManagerKind::Npm => &["run", "codegen"],
    }
  }
}

impl fmt::Display for PackageManagerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.program())
  }
}

/// A package manager found on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
  pub kind: PackageManagerKind,
  pub path: PathBuf,
}

impl PackageManager {
  /// The codegen invocation as a user would type it.
  pub fn codegen_command(&self) -> String {
    let mut parts = vec![self.kind.program()];
    parts.extend(self.kind.codegen_args());
    parts.join(" ")
  }
}

/// Find yarn, falling back to npm, on `PATH`.
pub fn detect_package_manager() -> Result<PackageManager, CodegenError> {
  detect_in(std::env::var_os("PATH"))
}

/// Find yarn, falling back to npm, in the given search path.
pub fn detect_in<P: AsRef<OsStr>>(search_path: Option<P>) -> Result<PackageManager, CodegenError> {
  let search_path = search_path.ok_or(CodegenError::NoPackageManager)?;
  for kind in PackageManagerKind::ALL {
    if let Ok(path) = which::which_in(kind.program(), Some(search_path.as_ref()), ".") {
      debug!(manager = %kind, path = %path.display(), "found package manager");
      return Ok(PackageManager { kind, path });
    }
  }
  Err(CodegenError::NoPackageManager)
}

/// Run the project's `codegen` script in `dir`.
pub async fn run_codegen(manager: &PackageManager, dir: &Path) -> Result<(), CodegenError> {
  let command = manager.codegen_command();
  info!(command = %command, dir = %dir.display(), "running code generation");

  let output = Command::new(&manager.path)
    .args(manager.kind.codegen_args())
    .current_dir(dir)
    .output()
    .await
    .map_err(|e| CodegenError::Spawn {
      program: manager.path.display().to_string(),
      source: e,
    })?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  if !stdout.trim().is_empty() {
    debug!(stdout = %stdout.trim(), "codegen output");
  }

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
      debug!(stderr = %stderr.trim(), "codegen stderr");
    }
    return Err(CodegenError::Failed {
      command,
      code: output.status.code(),
    });
  }

  Ok(())
}

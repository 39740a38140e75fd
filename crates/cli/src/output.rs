//! CLI output formatting utilities.
//!
//! Status lines start with a colored symbol. Errors and warnings go to
//! stderr with the message tinted as well; everything else goes to stdout.

use owo_colors::{AnsiColors, OwoColorize, Stream};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ADD: &str = "+";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
  Success,
  Error,
  Warning,
  Info,
}

impl Level {
  fn symbol(self) -> &'static str {
    match self {
      Level::Success => symbols::SUCCESS,
      Level::Error => symbols::ERROR,
      Level::Warning => symbols::WARNING,
      Level::Info => symbols::INFO,
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Level::Success => AnsiColors::Green,
      Level::Error => AnsiColors::Red,
      Level::Warning => AnsiColors::Yellow,
      Level::Info => AnsiColors::Blue,
    }
  }

  fn on_stderr(self) -> bool {
    matches!(self, Level::Error | Level::Warning)
  }

  fn stream(self) -> Stream {
    if self.on_stderr() { Stream::Stderr } else { Stream::Stdout }
  }

  /// The status line, colored when the target stream supports it.
  fn line(self, message: &str) -> String {
    let symbol = self.symbol();
    let symbol = symbol.if_supports_color(self.stream(), |s| s.color(self.color()));
    if self.on_stderr() {
      let message = message.if_supports_color(self.stream(), |m| m.color(self.color()));
      format!("{} {}", symbol, message)
    } else {
      format!("{} {}", symbol, message)
    }
  }
}

fn emit(level: Level, message: &str) {
  let line = level.line(message);
  if level.on_stderr() {
    eprintln!("{}", line);
  } else {
    println!("{}", line);
  }
}

pub fn print_success(message: &str) {
  emit(Level::Success, message);
}

pub fn print_error(message: &str) {
  emit(Level::Error, message);
}

pub fn print_warning(message: &str) {
  emit(Level::Warning, message);
}

pub fn print_info(message: &str) {
  emit(Level::Info, message);
}

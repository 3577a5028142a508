//! Report rendering for the usbload commands.
//!
//! Every command builds one serializable report and hands it to [`emit`],
//! which prints either the JSON form or the command's text layout.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use usbload_lib::artifact::ArtifactDescriptor;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

/// Width of the label column in text reports.
const LABEL_WIDTH: usize = 10;

/// Print `report` as pretty JSON, or run `text` to lay it out for a terminal.
pub fn emit<T: serde::Serialize>(format: OutputFormat, report: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
  match format {
    OutputFormat::Json => {
      let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
      println!("{json}");
    }
    OutputFormat::Text => text(report),
  }
  Ok(())
}

pub fn ready(message: &str) {
  println!("{} {}", "✓".if_supports_color(Stream::Stdout, |s| s.green()), message);
}

pub fn failure(message: &str) {
  eprintln!(
    "{} {}",
    "✗".if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

/// Unresolvable platform; the message already names the override to set.
pub fn unsupported(message: &str) {
  eprintln!(
    "{} {}",
    "⚠".if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn field(label: &str, value: impl std::fmt::Display) {
  let label = format!("{label:<LABEL_WIDTH$}");
  println!("  {} {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// Companion library line: only Windows and macOS bundle one.
pub fn secondary_label(secondary: Option<&ArtifactDescriptor>) -> &str {
  secondary.map_or("none (provided by the OS)", |a| a.name.as_str())
}

/// Library path with its on-disk size, when the file can be stat'ed.
pub fn library_label(path: &Path) -> String {
  match std::fs::metadata(path) {
    Ok(meta) => format!("{} ({} bytes)", path.display(), meta.len()),
    Err(_) => path.display().to_string(),
  }
}

/// Where the libraries came from: copied out of a packed bundle, or used where
/// they sit in an unpacked one.
pub fn extraction_summary(extracted: &[PathBuf]) -> String {
  match extracted.len() {
    0 => "Bundle is unpacked; libraries used in place".to_string(),
    n => format!("{n} file(s) extracted; removed when usbload exits"),
  }
}

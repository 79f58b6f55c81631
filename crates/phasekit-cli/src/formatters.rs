//! Output formatters for CLI reports.
//!
//! Every command report is a serializable struct; the output format only
//! changes its presentation.

use anyhow::Result;
use colored::Colorize;
use phasekit_core::cli::OutputFormat;
use serde::Serialize;
use serde_json::Value;

/// Formats `data` according to `format`.
///
/// # Errors
///
/// Returns an error if `data` cannot be serialized.
///
/// # Examples
///
/// ```
/// use phasekit_cli::formatters::format_output;
/// use phasekit_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Report {
///     phase: &'static str,
///     files: usize,
/// }
///
/// let report = Report { phase: "build", files: 3 };
/// let text = format_output(&report, OutputFormat::Text)?;
/// assert!(text.contains("phase: build"));
/// assert!(text.contains("files: 3"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::Text => {
            let mut lines = Vec::new();
            flatten(&serde_json::to_value(data)?, "", &mut lines);
            Ok(lines.join("\n"))
        }
        OutputFormat::Pretty => {
            let mut out = String::new();
            pretty(&serde_json::to_value(data)?, 0, &mut out);
            Ok(out.trim_end().to_string())
        }
    }
}

/// Writes one `key.path: value` line per leaf.
fn flatten(value: &Value, prefix: &str, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(child, &path, lines);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                flatten(child, &format!("{prefix}[{idx}]"), lines);
            }
        }
        leaf => lines.push(format!("{prefix}: {}", scalar(leaf))),
    }
}

fn pretty(value: &Value, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let label = format!("{}:", key.replace('_', " "));
                match child {
                    Value::Object(_) | Value::Array(_) => {
                        out.push_str(&format!("{pad}{}\n", label.bold()));
                        pretty(child, indent + 1, out);
                    }
                    leaf => out.push_str(&format!("{pad}{} {}\n", label.bold(), colored_scalar(leaf))),
                }
            }
        }
        Value::Array(items) if items.is_empty() => {
            out.push_str(&format!("{pad}{}\n", "(none)".dimmed()));
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => pretty(item, indent, out),
                    leaf => out.push_str(&format!("{pad}{} {}\n", "•".cyan(), colored_scalar(leaf))),
                }
            }
        }
        leaf => out.push_str(&format!("{pad}{}\n", colored_scalar(leaf))),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn colored_scalar(value: &Value) -> String {
    match value {
        Value::Null => "-".dimmed().to_string(),
        Value::Bool(true) => "yes".green().to_string(),
        Value::Bool(false) => "no".yellow().to_string(),
        Value::Number(n) => n.to_string().cyan().to_string(),
        other => scalar(other).green().to_string(),
    }
}

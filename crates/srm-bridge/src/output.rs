//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders state tree listings in the format selected by `--output`.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use srm_core::{ObjectKind, State, TreeEntry};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── State tree rows ──────────────────────────────────────────────────

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Ack")]
    ack: String,
    #[tabled(rename = "Changed")]
    changed: String,
}

/// Long JSON blobs (device lists) are cut for the table view.
const MAX_CELL: usize = 60;

fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_CELL {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_CELL - 1).collect();
    cut.push('…');
    cut
}

fn to_row(entry: &TreeEntry) -> StateRow {
    let (value, ack, changed) = match &entry.state {
        Some(state) => (
            truncate(state.val.to_string()),
            if state.ack { "yes" } else { "no" }.to_owned(),
            state.lc.format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        None => ("-".into(), "-".into(), "-".into()),
    };
    StateRow {
        path: entry.path.clone(),
        value,
        unit: entry.schema.unit.clone().unwrap_or_default(),
        ack,
        changed,
    }
}

/// Render state leaves; channels only appear in structured formats.
pub fn render_entries(format: OutputFormat, entries: &[TreeEntry]) -> Result<String, CliError> {
    let leaves = || {
        entries
            .iter()
            .filter(|e| e.schema.kind == ObjectKind::State)
    };
    match format {
        OutputFormat::Table => {
            let rows: Vec<StateRow> = leaves().map(to_row).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(entries, false),
        OutputFormat::JsonCompact => render_json(entries, true),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(entries)?),
        OutputFormat::Plain => Ok(leaves()
            .map(|e| plain_line(&e.path, e.state.as_ref()))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// `path = value` with `(pending)` for unacknowledged values.
pub fn plain_line(path: &str, state: Option<&State>) -> String {
    match state {
        Some(state) if state.ack => format!("{path} = {}", state.val),
        Some(state) => format!("{path} = {} (pending)", state.val),
        None => format!("{path} = -"),
    }
}

/// A state change line for `run --watch`.
pub fn change_line(path: &str, state: &State, color: bool) -> String {
    let time = state.ts.format("%H:%M:%S").to_string();
    let line = plain_line(path, Some(state));
    if color {
        format!("{} {}", time.dimmed(), line)
    } else {
        format!("{time} {line}")
    }
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let text = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(text)
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

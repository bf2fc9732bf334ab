//! Terminal rendering for CLI commands.
//!
//! Commands print through these helpers so `--json` and `--quiet` apply
//! uniformly: JSON mode turns every line into a `{"type", "payload"}` object,
//! quiet mode drops everything except errors.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde_json::{json, Value};

/// Global output flags from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    const fn mode(self) -> Mode {
        match (self.json, self.quiet) {
            (true, _) => Mode::Json,
            (false, true) => Mode::Quiet,
            (false, false) => Mode::Human,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Human,
    Quiet,
    Json,
}

static CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn mode() -> Mode {
    CONFIG
        .get_or_init(|| RwLock::new(OutputConfig::default()))
        .read()
        .mode()
}

/// Print `human` in human mode, or a typed JSON line in JSON mode.
fn emit(kind: &str, payload: Value, human: impl FnOnce()) {
    match mode() {
        Mode::Json => println!("{}", json!({ "type": kind, "payload": payload })),
        Mode::Human => human(),
        Mode::Quiet => {}
    }
}

/// Install the flags parsed from the command line.
pub fn configure(config: OutputConfig) {
    *CONFIG
        .get_or_init(|| RwLock::new(OutputConfig::default()))
        .write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    mode() == Mode::Json
}

pub fn header(version: &str) {
    emit("header", json!({ "version": version }), || {
        println!("{} {}", "fillwright".bold(), version.dimmed());
    });
}

pub fn section(title: &str) {
    emit("section", json!({ "title": title }), || {
        println!();
        println!("{}", title.bold().underline());
    });
}

/// Labeled value, aligned under its section.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit("field", json!({ "label": label, "value": value }), || {
        println!("  {:<10} {value}", label.dimmed());
    });
}

/// Preformatted block such as a rendered table. Human mode only.
pub fn lines(block: &str) {
    if mode() == Mode::Human {
        block.lines().for_each(|line| println!("  {line}"));
    }
}

pub fn success(message: &str) {
    emit("success", json!({ "message": message }), || {
        println!("{} {message}", "✓".green().bold());
    });
}

pub fn hint(message: &str) {
    if mode() == Mode::Human {
        println!("{}", message.italic().dimmed());
    }
}

/// Errors are never suppressed and always go to stderr.
pub fn error(message: &str) {
    if mode() == Mode::Json {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
    } else {
        eprintln!("{} {message}", "error:".red().bold());
    }
}

/// A complete JSON document for commands that answer in one object.
pub fn json_output(value: Value) {
    println!("{value}");
}

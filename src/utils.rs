use chrono::{DateTime, NaiveDateTime, Utc};
use eyre::{Context, Result};
use regex::Regex;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

/// Configuration required to run the export process.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone)]
pub struct ExportConfig {
    pub source: PathBuf,
    pub target_dir: PathBuf,
    pub quiet: bool,
}

/// Outcome of one export run.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// `(file name, source uuid)` for every note written, in write order.
    pub exported: Vec<(String, String)>,
    /// `(source uuid, error)` for every note that could not be written.
    pub failures: Vec<(String, String)>,
}

impl ExportSummary {
    pub fn count(&self) -> usize {
        self.exported.len()
    }
}

/// Parse a backup timestamp. Accepts RFC 3339 and, as a fallback, a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` value which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s\d\-_~,;\[\]\(\).]").expect("static pattern compiles")
});

/// Replace every character outside the filename allowlist with `-`.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_CHARS.replace_all(title, "-").into_owned()
}

/// `<sanitized title> <id>.md`
pub fn note_filename(title: &str, id: &str) -> String {
    format!("{} {}.md", sanitize_title(title), id)
}

/// Set the last-modified time of `path` to `when`.
pub fn set_modified(path: &Path, when: DateTime<Utc>) -> Result<()> {
    let file = File::options()
        .write(true)
        .open(path)
        .wrap_err_with(|| format!("Failed to reopen: {}", path.display()))?;
    file.set_modified(SystemTime::from(when))
        .wrap_err_with(|| format!("Failed to set modification time: {}", path.display()))
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use icalendar::Calendar;
use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").unwrap());

/// Collapses every run of characters outside `[A-Za-z0-9_-]` into a single
/// underscore, so any service name maps to a portable file name.
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "_").into_owned()
}

/// Writes the calendar to `<out_dir>/<sanitized service name>.ics`, creating
/// the directory if needed and overwriting any previous file.
pub fn export(out_dir: &Path, service_name: &str, calendar: &Calendar) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.ics", sanitize_file_name(service_name)));
    fs::write(&path, calendar.to_string())
        .with_context(|| format!("writing calendar {}", path.display()))?;
    Ok(path)
}

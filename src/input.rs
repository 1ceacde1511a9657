//! Reading flat records from files.
//!
//! `.jsonl` and `.ndjson` files hold one record per line. Anything else is
//! JSON: either an array of records or a single record.

use exn::ResultExt;
use irve_model::Statique;
use std::path::Path;

use crate::error::{ErrorKind, Result};

fn is_json_lines(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl") || e.eq_ignore_ascii_case("ndjson"))
}

pub async fn read_records(path: &Path) -> Result<Vec<Statique>> {
    let contents = tokio::fs::read_to_string(path).await.or_raise(|| ErrorKind::Read(path.to_path_buf()))?;
    if is_json_lines(path) { parse_lines(path, &contents) } else { parse_json(path, &contents) }
}

fn invalid(path: &Path, reason: String) -> ErrorKind {
    ErrorKind::Input { path: path.to_path_buf(), reason }
}

fn parse_json(path: &Path, contents: &str) -> Result<Vec<Statique>> {
    let trimmed = contents.trim_start();
    if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).or_raise(|| invalid(path, "expected an array of records".to_string()))
    } else {
        let record = serde_json::from_str(trimmed).or_raise(|| invalid(path, "expected a record".to_string()))?;
        Ok(vec![record])
    }
}

fn parse_lines(path: &Path, contents: &str) -> Result<Vec<Statique>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).or_raise(|| invalid(path, format!("line {}", index + 1)))
        })
        .collect()
}

use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};

/// Key the frontend reads the local AshNFT address from.
pub const ENV_KEY: &str = "NEXT_PUBLIC_ASHNFT_ADDRESS_LOCAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
}

/// Returns `content` with exactly one `key=value` line.
///
/// The first line starting with `key=` is rewritten in place and keeps its line
/// terminator; any later duplicates are dropped. Without a match the entry is
/// appended on a new line.
pub fn upsert(content: &str, key: &str, value: &str) -> String {
    let prefix = format!("{key}=");
    let entry = format!("{prefix}{value}");

    let mut output = String::with_capacity(content.len() + entry.len() + 1);
    let mut found = false;
    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(&['\r', '\n'][..]);
        if !body.starts_with(&prefix) {
            output.push_str(line);
            continue;
        }
        if found {
            continue;
        }
        found = true;
        output.push_str(&entry);
        output.push_str(&line[body.len()..]);
    }

    if !found {
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(&entry);
        output.push('\n');
    }
    output
}

/// Reads `path` (a missing file counts as empty), upserts `key=value` and
/// writes the result back.
pub fn update(path: &Path, key: &str, value: &str) -> Result<Outcome> {
    let (content, outcome) = match fs::read_to_string(path) {
        Ok(content) => {
            log::info!("found existing env file {}", path.display());
            (content, Outcome::Updated)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::info!("env file {} not found, creating it", path.display());
            (String::new(), Outcome::Created)
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    fs::write(path, upsert(&content, key, value))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(outcome)
}

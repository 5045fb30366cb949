use std::{fs, path::Path};

use anyhow::{bail, Context};
use client_core::ReviewerDetails;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct BatchFile {
    #[serde(default)]
    candidates: Vec<ReviewerDetails>,
}

pub fn load_batch(path: &Path) -> anyhow::Result<Vec<ReviewerDetails>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read batch file '{}'", path.display()))?;
    parse_batch(&raw).with_context(|| format!("invalid batch file '{}'", path.display()))
}

/// Parses `[[candidates]]` tables. Blank names or emails are refused up front
/// so the operator sees the line before anything is staged.
pub fn parse_batch(raw: &str) -> anyhow::Result<Vec<ReviewerDetails>> {
    let file: BatchFile = toml::from_str(raw)?;
    for (index, candidate) in file.candidates.iter().enumerate() {
        if candidate.name.trim().is_empty() || candidate.email.trim().is_empty() {
            bail!("candidate #{} needs both a name and an email", index + 1);
        }
    }
    Ok(file
        .candidates
        .into_iter()
        .map(|mut c| {
            c.email = c.email.trim().to_string();
            c
        })
        .collect())
}

#[cfg(test)]
#[path = "tests/batch_tests.rs"]
mod tests;

use crate::model::{MatchRecord, StoredMatch};
use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::warn;

pub fn load_matches(path: &Path) -> Result<Vec<MatchRecord>> {
    if !path.exists() {
        bail!("match file not found: {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read match file {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let stored: Vec<StoredMatch> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse match file {}", path.display()))?;

    let total = stored.len();
    let mut matches = Vec::with_capacity(total);
    for entry in stored {
        let (year, home, away) = (entry.year, entry.home_team.clone(), entry.away_team.clone());
        match entry.into_record() {
            Some(record) => matches.push(record),
            None => warn!(
                year,
                home = %home,
                away = %away,
                file = %path.display(),
                "skipping stored match without both teams and goals"
            ),
        }
    }
    if matches.len() < total {
        warn!(
            skipped = total - matches.len(),
            kept = matches.len(),
            file = %path.display(),
            "match file has incomplete records"
        );
    }
    Ok(matches)
}

pub fn save_matches(path: &Path, matches: &[MatchRecord]) -> Result<()> {
    let serialized = serde_json::to_string_pretty(matches)?;
    write_atomically(path, serialized.as_bytes())
}

pub fn write_team_list(path: &Path, teams: &[String]) -> Result<()> {
    let mut content = teams.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    write_atomically(path, content.as_bytes())
}

pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let mut tmp_name = path
        .file_name()
        .with_context(|| format!("output path has no file name: {}", path.display()))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, bytes)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to move {} into place at {}",
            tmp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}

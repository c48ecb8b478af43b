use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub year: i32,
    pub phase: String,
    pub date: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub score_raw: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub stadium: Option<String>,
}

/// A match as read back from disk; older files may hold null or textual goals.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredMatch {
    pub year: i32,
    pub phase: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default, alias = "score")]
    pub score_raw: Option<String>,
    #[serde(default, deserialize_with = "optional_goals")]
    pub home_goals: Option<u32>,
    #[serde(default, deserialize_with = "optional_goals")]
    pub away_goals: Option<u32>,
    #[serde(default)]
    pub stadium: Option<String>,
}

impl StoredMatch {
    pub fn into_record(self) -> Option<MatchRecord> {
        let home_team = self.home_team.trim();
        let away_team = self.away_team.trim();
        if home_team.is_empty() || away_team.is_empty() {
            return None;
        }

        Some(MatchRecord {
            year: self.year,
            phase: self.phase,
            date: self.date,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            score_raw: self.score_raw.unwrap_or_default(),
            home_goals: self.home_goals?,
            away_goals: self.away_goals?,
            stadium: self.stadium,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GoalsRepr {
    Number(u32),
    Digits(String),
}

fn optional_goals<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<GoalsRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(GoalsRepr::Number(value)) => Ok(Some(value)),
        Some(GoalsRepr::Digits(text)) if text.trim().is_empty() => Ok(None),
        Some(GoalsRepr::Digits(text)) => text
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|err| serde::de::Error::custom(format!("invalid goal count {text:?}: {err}"))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamLocation {
    pub city: String,
    pub altitude: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct YearReport {
    pub year: i32,
    pub url: String,
    pub group_matches: usize,
    pub knockout_matches: usize,
    pub error: Option<String>,
}

impl YearReport {
    pub fn total(&self) -> usize {
        self.group_matches + self.knockout_matches
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub tournament: String,
    pub years: Vec<YearReport>,
    pub total_matches: usize,
    pub output_path: PathBuf,
}

impl RunReport {
    pub fn failed_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter(|y| y.error.is_some())
            .map(|y| y.year)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessReport {
    pub matches_loaded: usize,
    pub teams_mapped: usize,
    pub rows_written: usize,
    pub missing_teams: Vec<String>,
    pub output_path: PathBuf,
}

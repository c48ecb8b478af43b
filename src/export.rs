use crate::mapping::TeamLookup;
use crate::model::MatchRecord;
use crate::store::write_atomically;
use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::path::Path;

const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRow {
    pub year: i32,
    pub phase: String,
    pub date: Option<String>,
    pub home_team: String,
    pub home_city: String,
    #[serde(serialize_with = "meters")]
    pub home_altitude_meters: f64,
    pub away_team: String,
    pub away_city: String,
    #[serde(serialize_with = "meters")]
    pub away_altitude_meters: f64,
    #[serde(serialize_with = "meters")]
    pub altitude_difference: f64,
    pub home_goals: u32,
    pub away_goals: u32,
    pub score_raw: String,
    pub stadium: Option<String>,
}

fn meters<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct JoinedMatches {
    pub rows: Vec<AnalysisRow>,
    pub missing_teams: BTreeSet<String>,
}

pub fn join_with_locations(matches: &[MatchRecord], lookup: &TeamLookup) -> JoinedMatches {
    let mut joined = JoinedMatches::default();

    for record in matches {
        if record.home_team.is_empty() || record.away_team.is_empty() {
            continue;
        }

        let home = lookup.get(&record.home_team);
        let away = lookup.get(&record.away_team);
        if home.is_none() {
            joined.missing_teams.insert(record.home_team.clone());
        }
        if away.is_none() {
            joined.missing_teams.insert(record.away_team.clone());
        }
        let (Some(home), Some(away)) = (home, away) else {
            continue;
        };

        joined.rows.push(AnalysisRow {
            year: record.year,
            phase: record.phase.clone(),
            date: record.date.clone(),
            home_team: record.home_team.clone(),
            home_city: home.city.clone(),
            home_altitude_meters: home.altitude,
            away_team: record.away_team.clone(),
            away_city: away.city.clone(),
            away_altitude_meters: away.altitude,
            altitude_difference: home.altitude - away.altitude,
            home_goals: record.home_goals,
            away_goals: record.away_goals,
            score_raw: record.score_raw.clone(),
            stadium: record.stadium.clone(),
        });
    }

    joined
}

pub fn write_analysis_csv(path: &Path, rows: &[AnalysisRow]) -> Result<()> {
    let mut buffer = UTF8_BOM.as_bytes().to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        for row in rows {
            writer
                .serialize(row)
                .context("failed to serialize analysis row")?;
        }
        writer.flush().context("failed to flush analysis csv")?;
    }
    write_atomically(path, &buffer)
}

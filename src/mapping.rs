use crate::model::TeamLocation;
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct TeamLookup {
    pub teams: BTreeMap<String, TeamLocation>,
    pub cities: usize,
    pub malformed: Vec<String>,
}

impl TeamLookup {
    pub fn get(&self, team: &str) -> Option<&TeamLocation> {
        self.teams.get(team)
    }
}

pub fn load_city_mappings(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        bail!("city mapping file not found: {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read city mapping file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse city mapping file {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!(
            "city mapping file {} must contain a JSON object keyed by city",
            path.display()
        ),
    }
}

/// Inverts `city -> {altitude, teams}` into `team -> {city, altitude}`.
pub fn build_team_lookup(cities: &Map<String, Value>) -> TeamLookup {
    let mut lookup = TeamLookup {
        cities: cities.len(),
        ..TeamLookup::default()
    };

    for (city, entry) in cities {
        let Some(altitude) = entry.get("altitude").and_then(Value::as_f64) else {
            lookup
                .malformed
                .push(format!("{city} (missing or non-numeric 'altitude')"));
            continue;
        };
        let Some(teams) = entry.get("teams") else {
            lookup.malformed.push(format!("{city} (missing 'teams')"));
            continue;
        };
        let Some(teams) = teams.as_array() else {
            lookup
                .malformed
                .push(format!("{city} ('teams' is not a list)"));
            continue;
        };

        for team in teams {
            let Some(name) = team.as_str() else {
                lookup
                    .malformed
                    .push(format!("{city} (non-string team entry {team})"));
                continue;
            };
            lookup.teams.insert(
                name.to_string(),
                TeamLocation {
                    city: city.clone(),
                    altitude,
                },
            );
        }
    }

    for problem in &lookup.malformed {
        warn!(entry = %problem, "skipping malformed city mapping entry");
    }

    lookup
}

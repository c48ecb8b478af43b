use crate::model::MatchRecord;
use crate::score::{is_score_shaped, parse_score};
use crate::teams::normalize_team_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFields {
    pub date: Option<String>,
    pub stadium: Option<String>,
    pub home: String,
    pub score: String,
    pub away: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Full,
    Fixed,
}

pub fn classify_row(cells: &[String], mode: LayoutMode) -> Option<RowFields> {
    match cells.len() {
        5 => Some(RowFields {
            date: non_empty(&cells[0]),
            stadium: non_empty(&cells[1]),
            home: cells[2].clone(),
            score: cells[3].clone(),
            away: cells[4].clone(),
        }),
        4 => Some(classify_four(cells)),
        _ if mode == LayoutMode::Full => classify_by_score_position(cells),
        _ => None,
    }
}

fn classify_four(cells: &[String]) -> RowFields {
    if !is_score_shaped(&cells[2]) && is_score_shaped(&cells[1]) {
        return RowFields {
            date: None,
            stadium: non_empty(&cells[3]),
            home: cells[0].clone(),
            score: cells[1].clone(),
            away: cells[2].clone(),
        };
    }

    RowFields {
        date: non_empty(&cells[0]),
        stadium: None,
        home: cells[1].clone(),
        score: cells[2].clone(),
        away: cells[3].clone(),
    }
}

fn classify_by_score_position(cells: &[String]) -> Option<RowFields> {
    if cells.len() < 3 {
        return None;
    }

    let last = cells.len() - 1;
    let mut candidates = (1..last).filter(|&i| is_score_shaped(&cells[i]));
    let score_idx = candidates.next()?;
    if candidates.next().is_some() {
        return None;
    }

    let home_idx = score_idx - 1;
    Some(RowFields {
        date: if home_idx > 0 {
            non_empty(&cells[0])
        } else {
            None
        },
        stadium: None,
        home: cells[home_idx].clone(),
        score: cells[score_idx].clone(),
        away: cells[score_idx + 1].clone(),
    })
}

pub fn build_record(year: i32, phase: &str, fields: RowFields) -> Option<MatchRecord> {
    if !is_score_shaped(&fields.score) {
        return None;
    }
    let (home_goals, away_goals) = parse_score(Some(&fields.score))?;
    let home_goals = home_goals.parse::<u32>().ok()?;
    let away_goals = away_goals.parse::<u32>().ok()?;

    let home_team = normalize_team_name(&fields.home);
    let away_team = normalize_team_name(&fields.away);
    if home_team.is_empty() || away_team.is_empty() {
        return None;
    }

    Some(MatchRecord {
        year,
        phase: phase.to_string(),
        date: fields.date,
        home_team,
        away_team,
        score_raw: fields.score,
        home_goals,
        away_goals,
        stadium: fields.stadium,
    })
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

use crate::html::{describe_table, element_text, heading_label, is_heading, row_cells, table_rows};
use crate::model::MatchRecord;
use crate::parser::MatchParser;
use crate::row::{RowFields, build_record};
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

pub const KNOCKOUT_HEADING_LEVELS: &[&str] = &["h2", "h3"];

const KNOCKOUT_CELLS: usize = 5;

#[derive(Debug, Clone, Copy)]
pub enum KnockoutEvent<'a> {
    Heading(ElementRef<'a>),
    Table(ElementRef<'a>),
}

#[derive(Debug, Clone)]
pub struct KnockoutState {
    pub phase: String,
    pub records: Vec<MatchRecord>,
}

impl KnockoutState {
    pub fn new(initial_phase: &str) -> Self {
        Self {
            phase: initial_phase.to_string(),
            records: Vec::new(),
        }
    }

    pub fn step(mut self, event: KnockoutEvent<'_>, year: i32) -> Self {
        match event {
            KnockoutEvent::Heading(heading) => {
                let label = heading_label(heading);
                if !label.is_empty() {
                    self.phase = label;
                }
            }
            KnockoutEvent::Table(table) => {
                if let Some(record) = parse_knockout_table(table, year, &self.phase) {
                    self.records.push(record);
                }
            }
        }
        self
    }
}

pub fn knockout_events<'a>(parser: &MatchParser, doc: &'a Html) -> Vec<KnockoutEvent<'a>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|element| {
            if is_heading(element, KNOCKOUT_HEADING_LEVELS) {
                Some(KnockoutEvent::Heading(element))
            } else if parser.knockout_tables().matches(&element) {
                Some(KnockoutEvent::Table(element))
            } else {
                None
            }
        })
        .collect()
}

pub fn extract_knockout_matches(parser: &MatchParser, doc: &Html, year: i32) -> Vec<MatchRecord> {
    let state = knockout_events(parser, doc)
        .into_iter()
        .fold(KnockoutState::new(&parser.config().knockout_phase), |state, event| {
            state.step(event, year)
        });

    debug!(year, matches = state.records.len(), "knockout extraction finished");
    state.records
}

pub fn parse_knockout_table(table: ElementRef<'_>, year: i32, phase: &str) -> Option<MatchRecord> {
    let Some(first_row) = table_rows(table).next() else {
        warn!(year, phase, table = %describe_table(table), "knockout table has no rows; skipping");
        return None;
    };

    let cells = row_cells(first_row, "td");
    if cells.len() < KNOCKOUT_CELLS {
        warn!(
            year,
            phase,
            cells = cells.len(),
            table = %describe_table(table),
            "knockout table has fewer than five cells; skipping"
        );
        return None;
    }

    let texts: Vec<String> = cells[..KNOCKOUT_CELLS]
        .iter()
        .map(|cell| element_text(*cell))
        .collect();
    let venue = texts[4].split(',').next().unwrap_or_default().trim();

    let fields = RowFields {
        date: Some(texts[0].clone()).filter(|d| !d.is_empty()),
        stadium: Some(venue.to_string()).filter(|v| !v.is_empty()),
        home: texts[1].clone(),
        score: texts[2].clone(),
        away: texts[3].clone(),
    };

    let record = build_record(year, phase, fields);
    if record.is_none() {
        warn!(
            year,
            phase,
            score = %texts[2],
            table = %describe_table(table),
            "knockout table has no parseable score or is missing a team; skipping"
        );
    }
    record
}

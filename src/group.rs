use crate::html::{
    all_tables, describe_table, element_text, heading_label, own_table_rows, row_cell_texts,
    row_cells, table_has_score, table_rows,
};
use crate::locate::{LocateScope, anchor_for_heading};
use crate::model::MatchRecord;
use crate::parser::MatchParser;
use crate::row::{LayoutMode, build_record, classify_row};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info};

static GROUP_HEADINGS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, h4").expect("group heading selector must parse"));

pub fn extract_group_matches(parser: &MatchParser, doc: &Html, year: i32) -> Vec<MatchRecord> {
    let headings: Vec<ElementRef<'_>> = {
        let scope = parser.scope(&[]);
        doc.select(&GROUP_HEADINGS)
            .filter(|heading| scope.is_group_heading(*heading))
            .collect()
    };

    let mut records = Vec::new();
    let mut consumed: Vec<ElementRef<'_>> = Vec::new();

    for heading in headings {
        let group = heading_label(heading);
        let anchor = anchor_for_heading(heading);
        let located = locate_group_table(parser, anchor, &parser.scope(&consumed));

        let Some((strategy, table)) = located else {
            debug!(year, group = %group, "no fixtures table found for group heading");
            continue;
        };
        consumed.push(table);

        let parsed = parse_rows(
            table_rows(table),
            year,
            &group,
            LayoutMode::Full,
            &parser.config().header_labels,
        );
        debug!(
            year,
            group = %group,
            strategy,
            matches = parsed.len(),
            table = %describe_table(table),
            "group table parsed"
        );
        records.extend(parsed);
    }

    if records.is_empty() {
        records = scan_all_tables(parser, doc, year);
        if !records.is_empty() {
            info!(
                year,
                matches = records.len(),
                "no group heading yielded matches; recovered from document-wide table scan"
            );
        }
    }

    records
}

pub fn locate_group_table<'a>(
    parser: &MatchParser,
    anchor: ElementRef<'a>,
    scope: &LocateScope<'_, '_>,
) -> Option<(&'static str, ElementRef<'a>)> {
    parser.locators().iter().find_map(|locator| {
        locator
            .try_locate(anchor, scope)
            .map(|table| (locator.key(), table))
    })
}

pub fn scan_all_tables(parser: &MatchParser, doc: &Html, year: i32) -> Vec<MatchRecord> {
    let config = parser.config();
    let mut records = Vec::new();

    for table in all_tables(doc) {
        if parser.knockout_tables().matches(&table) || !table_has_score(table) {
            continue;
        }
        records.extend(parse_rows(
            own_table_rows(table),
            year,
            &config.group_phase,
            LayoutMode::Fixed,
            &config.header_labels,
        ));
    }

    records
}

pub fn parse_rows<'a>(
    rows: impl Iterator<Item = ElementRef<'a>>,
    year: i32,
    phase: &str,
    mode: LayoutMode,
    header_labels: &[String],
) -> Vec<MatchRecord> {
    let mut records = Vec::new();

    for row in rows {
        if is_header_row(row, header_labels) {
            continue;
        }

        let cells = row_cell_texts(row);
        if cells.is_empty() {
            continue;
        }

        let Some(fields) = classify_row(&cells, mode) else {
            debug!(year, phase, cells = cells.len(), "row layout not recognized; skipping");
            continue;
        };

        match build_record(year, phase, fields) {
            Some(record) => records.push(record),
            None => debug!(
                year,
                phase,
                row = %cells.join(" | "),
                "row has no parseable score or is missing a team; skipping"
            ),
        }
    }

    records
}

pub fn is_header_row(row: ElementRef<'_>, header_labels: &[String]) -> bool {
    row_cells(row, "th").into_iter().any(|th| {
        let text = element_text(th).to_lowercase();
        header_labels
            .iter()
            .any(|label| text.contains(&label.to_lowercase()))
    })
}

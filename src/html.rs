use crate::score::is_score_shaped;
use scraper::node::Node;
use scraper::{CaseSensitivity, ElementRef, Html, Selector};
use std::sync::LazyLock;

static HEADLINE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.mw-headline").expect("headline selector must parse"));
static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector must parse"));
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("row selector must parse"));

const HIDDEN_ELEMENTS: &[&str] = &["style", "script"];
const HIDDEN_CLASSES: &[&str] = &["mw-editsection"];

pub fn parse_document(body: &[u8]) -> Option<Html> {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return None;
    }
    Some(Html::parse_document(&text))
}

pub fn element_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(is_hidden_element);
        if !hidden {
            parts.push(&**text);
        }
    }

    parts
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_hidden_element(element: ElementRef<'_>) -> bool {
    let value = element.value();
    HIDDEN_ELEMENTS.contains(&value.name())
        || HIDDEN_CLASSES
            .iter()
            .any(|class| value.has_class(class, CaseSensitivity::CaseSensitive))
}

pub fn is_heading(element: ElementRef<'_>, levels: &[&str]) -> bool {
    levels.contains(&element.value().name())
}

pub fn heading_label(heading: ElementRef<'_>) -> String {
    if let Some(headline) = heading.select(&HEADLINE).next() {
        let text = element_text(headline);
        if !text.is_empty() {
            return text;
        }
    }
    element_text(heading)
}

pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element
        .value()
        .has_class(class, CaseSensitivity::AsciiCaseInsensitive)
}

pub fn is_table(element: ElementRef<'_>) -> bool {
    element.value().name() == "table"
}

pub fn table_has_score(table: ElementRef<'_>) -> bool {
    is_score_shaped(&element_text(table))
}

pub fn descendant_tables(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.select(&TABLE)
}

pub fn all_tables(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.select(&TABLE)
}

pub fn next_element_siblings(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.next_siblings().filter_map(ElementRef::wrap)
}

pub fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

pub fn table_rows(table: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    table.select(&ROW)
}

pub fn own_table_rows(table: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    let table_id = table.id();
    table.select(&ROW).filter(move |row| {
        row.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| is_table(*el))
            .is_some_and(|closest| closest.id() == table_id)
    })
}

pub fn row_cells<'a>(row: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == name)
        .collect()
}

pub fn row_cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row_cells(row, "td").into_iter().map(element_text).collect()
}

pub fn describe_table(table: ElementRef<'_>) -> String {
    const PREVIEW_CHARS: usize = 60;
    let text = element_text(table);
    if text.chars().count() <= PREVIEW_CHARS {
        return text;
    }
    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{preview}…")
}

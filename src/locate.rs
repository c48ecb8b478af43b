use crate::html::{
    descendant_tables, element_text, has_class, heading_label, is_heading, is_table,
    next_element_siblings, parent_element, table_has_score,
};
use regex::Regex;
use scraper::{ElementRef, Selector};

pub const GROUP_HEADING_LEVELS: &[&str] = &["h2", "h3", "h4"];

const WRAPPER_CLASSES: &[&str] = &["wikitable-wrapper", "mw-parser-output"];
const COLLAPSIBLE_CLASSES: &[&str] = &["collapsible", "mw-collapsible"];
const HEADING_WRAPPER_CLASS: &str = "mw-heading";

pub trait TableLocator: Send + Sync {
    fn key(&self) -> &'static str;
    fn try_locate<'a>(
        &self,
        anchor: ElementRef<'a>,
        scope: &LocateScope<'_, '_>,
    ) -> Option<ElementRef<'a>>;
}

pub struct LocateScope<'s, 'doc> {
    pub knockout_tables: &'s Selector,
    pub group_heading: &'s Regex,
    pub consumed: &'s [ElementRef<'doc>],
}

impl LocateScope<'_, '_> {
    pub fn accepts(&self, table: ElementRef<'_>) -> bool {
        is_table(table)
            && !self.consumed.iter().any(|seen| seen.id() == table.id())
            && !self.knockout_tables.matches(&table)
            && table_has_score(table)
    }

    pub fn is_group_heading(&self, element: ElementRef<'_>) -> bool {
        is_heading(element, GROUP_HEADING_LEVELS)
            && self.group_heading.is_match(&heading_label(element))
    }

    pub fn is_group_anchor(&self, element: ElementRef<'_>) -> bool {
        if self.is_group_heading(element) {
            return true;
        }
        has_class(element, HEADING_WRAPPER_CLASS)
            && element
                .child_elements()
                .any(|child| self.is_group_heading(child))
    }

    fn first_accepted<'a>(&self, container: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if self.accepts(container) {
            return Some(container);
        }
        descendant_tables(container).find(|table| self.accepts(*table))
    }
}

pub fn anchor_for_heading(heading: ElementRef<'_>) -> ElementRef<'_> {
    parent_element(heading)
        .filter(|parent| has_class(*parent, HEADING_WRAPPER_CLASS))
        .unwrap_or(heading)
}

pub fn default_locators(max_hops: usize, marker: &str) -> Vec<Box<dyn TableLocator>> {
    vec![
        Box::new(SiblingWalk { max_hops }),
        Box::new(HeadingDescendants),
        Box::new(MatchesMarker {
            marker: marker.to_string(),
            max_hops,
        }),
    ]
}

pub struct SiblingWalk {
    pub max_hops: usize,
}

impl TableLocator for SiblingWalk {
    fn key(&self) -> &'static str {
        "sibling_walk"
    }

    fn try_locate<'a>(
        &self,
        anchor: ElementRef<'a>,
        scope: &LocateScope<'_, '_>,
    ) -> Option<ElementRef<'a>> {
        for sibling in next_element_siblings(anchor).take(self.max_hops) {
            if scope.is_group_anchor(sibling) {
                break;
            }
            if let Some(table) = table_in_sibling(sibling, scope) {
                return Some(table);
            }
        }
        None
    }
}

fn table_in_sibling<'a>(
    sibling: ElementRef<'a>,
    scope: &LocateScope<'_, '_>,
) -> Option<ElementRef<'a>> {
    if is_table(sibling) && scope.accepts(sibling) {
        return Some(sibling);
    }

    if WRAPPER_CLASSES.iter().any(|class| has_class(sibling, class))
        && let Some(first) = descendant_tables(sibling).next()
        && scope.accepts(first)
    {
        return Some(first);
    }

    if COLLAPSIBLE_CLASSES.iter().any(|class| has_class(sibling, class))
        && let Some(inner) = descendant_tables(sibling).find(|t| scope.accepts(*t))
    {
        return Some(inner);
    }

    descendant_tables(sibling).find(|t| scope.accepts(*t))
}

pub struct HeadingDescendants;

impl TableLocator for HeadingDescendants {
    fn key(&self) -> &'static str {
        "heading_descendants"
    }

    fn try_locate<'a>(
        &self,
        anchor: ElementRef<'a>,
        scope: &LocateScope<'_, '_>,
    ) -> Option<ElementRef<'a>> {
        scope.first_accepted(anchor)
    }
}

pub struct MatchesMarker {
    pub marker: String,
    pub max_hops: usize,
}

impl TableLocator for MatchesMarker {
    fn key(&self) -> &'static str {
        "matches_marker"
    }

    fn try_locate<'a>(
        &self,
        anchor: ElementRef<'a>,
        scope: &LocateScope<'_, '_>,
    ) -> Option<ElementRef<'a>> {
        for sibling in next_element_siblings(anchor).take(self.max_hops) {
            if scope.is_group_anchor(sibling) {
                break;
            }
            if !element_text(sibling).contains(&self.marker) {
                continue;
            }
            if let Some(table) = scope.first_accepted(sibling) {
                return Some(table);
            }
            if let Some(table) = next_element_siblings(sibling)
                .next()
                .and_then(|after| scope.first_accepted(after))
            {
                return Some(table);
            }
        }
        None
    }
}

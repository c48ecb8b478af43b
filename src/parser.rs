use crate::config::ExtractConfig;
use crate::group::extract_group_matches;
use crate::knockout::extract_knockout_matches;
use crate::locate::{LocateScope, TableLocator, default_locators};
use crate::model::MatchRecord;
use anyhow::{Context, Result, anyhow};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

pub struct MatchParser {
    config: ExtractConfig,
    knockout_tables: Selector,
    group_heading: Regex,
    locators: Vec<Box<dyn TableLocator>>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub group: Vec<MatchRecord>,
    pub knockout: Vec<MatchRecord>,
}

impl ParsedDocument {
    pub fn into_records(self) -> Vec<MatchRecord> {
        let mut records = self.group;
        records.extend(self.knockout);
        records
    }
}

impl MatchParser {
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        config.validate()?;

        let knockout_tables = Selector::parse(&config.knockout_selector).map_err(|err| {
            anyhow!(
                "invalid knockout selector {}: {err:?}",
                config.knockout_selector
            )
        })?;
        let group_heading = Regex::new(&config.group_heading_pattern).with_context(|| {
            format!(
                "invalid group heading pattern {}",
                config.group_heading_pattern
            )
        })?;

        Ok(Self {
            config: config.clone(),
            knockout_tables,
            group_heading,
            locators: default_locators(config.max_sibling_hops, &config.matches_marker),
        })
    }

    pub fn with_locators(mut self, locators: Vec<Box<dyn TableLocator>>) -> Self {
        self.locators = locators;
        self
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn knockout_tables(&self) -> &Selector {
        &self.knockout_tables
    }

    pub fn locators(&self) -> &[Box<dyn TableLocator>] {
        &self.locators
    }

    pub fn scope<'s, 'doc>(&'s self, consumed: &'s [ElementRef<'doc>]) -> LocateScope<'s, 'doc> {
        LocateScope {
            knockout_tables: &self.knockout_tables,
            group_heading: &self.group_heading,
            consumed,
        }
    }

    pub fn parse_document(&self, doc: &Html, year: i32) -> ParsedDocument {
        ParsedDocument {
            group: extract_group_matches(self, doc, year),
            knockout: extract_knockout_matches(self, doc, year),
        }
    }
}

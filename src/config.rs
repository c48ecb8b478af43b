use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use regex::Regex;
use scraper::Selector;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_KNOCKOUT_PHASE: &str = "Fase Final";
pub const DEFAULT_GROUP_PHASE: &str = "Fase de Grupos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Tournament {
    Libertadores,
    Sudamericana,
}

impl Tournament {
    pub const ALL: [Tournament; 2] = [Tournament::Libertadores, Tournament::Sudamericana];

    pub fn key(self) -> &'static str {
        match self {
            Tournament::Libertadores => "libertadores",
            Tournament::Sudamericana => "sudamericana",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tournament::Libertadores => "Copa Libertadores",
            Tournament::Sudamericana => "Copa Sudamericana",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Tournament::Libertadores => "https://es.wikipedia.org/wiki/Copa_Libertadores_",
            Tournament::Sudamericana => "https://es.wikipedia.org/wiki/Copa_Sudamericana_",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(value))
    }

    pub fn matches_file_name(self) -> String {
        format!("{}_matches.json", self.key())
    }

    pub fn analysis_file_name(self) -> String {
        format!("{}_analysis.csv", self.key())
    }

    pub fn teams_file_name(self) -> String {
        format!("unique_teams_{}.txt", self.key())
    }
}

impl fmt::Display for Tournament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub years: YearRange,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub tournaments: BTreeMap<String, TournamentConfig>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be greater than zero");
        }
        if self.fetch.user_agent.trim().is_empty() {
            bail!("fetch.user_agent must not be empty");
        }
        if self.fetch.mode == FetchMode::File && self.fetch.file_dir.is_none() {
            bail!("fetch.file_dir is required for file mode");
        }
        if self.years.newest < self.years.oldest {
            bail!(
                "years.newest ({}) must not be older than years.oldest ({})",
                self.years.newest,
                self.years.oldest
            );
        }

        self.extract.validate()?;

        for (key, tournament) in &self.tournaments {
            if Tournament::from_key(key).is_none() {
                bail!("unknown tournament section [tournaments.{key}]");
            }
            if let Some(base_url) = &tournament.base_url {
                Url::parse(base_url)
                    .with_context(|| format!("invalid base_url for tournament {key}"))?;
            }
        }

        Ok(())
    }

    pub fn base_url(&self, tournament: Tournament) -> String {
        self.tournaments
            .iter()
            .find(|(key, _)| Tournament::from_key(key) == Some(tournament))
            .and_then(|(_, cfg)| cfg.base_url.clone())
            .unwrap_or_else(|| tournament.default_base_url().to_string())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    #[default]
    Http,
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: FetchMode,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub file_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Http,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            file_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct YearRange {
    #[serde(default = "default_newest_year")]
    pub newest: i32,
    #[serde(default = "default_oldest_year")]
    pub oldest: i32,
}

impl YearRange {
    pub fn descending(&self) -> impl Iterator<Item = i32> {
        (self.oldest..=self.newest).rev()
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            newest: default_newest_year(),
            oldest: default_oldest_year(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_knockout_selector")]
    pub knockout_selector: String,
    #[serde(default = "default_knockout_phase")]
    pub knockout_phase: String,
    #[serde(default = "default_group_phase")]
    pub group_phase: String,
    #[serde(default = "default_group_heading_pattern")]
    pub group_heading_pattern: String,
    #[serde(default = "default_max_sibling_hops")]
    pub max_sibling_hops: usize,
    #[serde(default = "default_matches_marker")]
    pub matches_marker: String,
    #[serde(default = "default_header_labels")]
    pub header_labels: Vec<String>,
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<()> {
        if self.knockout_phase.trim().is_empty() {
            bail!("extract.knockout_phase must not be empty");
        }
        if self.group_phase.trim().is_empty() {
            bail!("extract.group_phase must not be empty");
        }
        if self.max_sibling_hops == 0 {
            bail!("extract.max_sibling_hops must be greater than zero");
        }
        Selector::parse(&self.knockout_selector).map_err(|err| {
            anyhow::anyhow!(
                "invalid extract.knockout_selector {}: {err:?}",
                self.knockout_selector
            )
        })?;
        Regex::new(&self.group_heading_pattern).with_context(|| {
            format!(
                "invalid extract.group_heading_pattern {}",
                self.group_heading_pattern
            )
        })?;
        Ok(())
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            knockout_selector: default_knockout_selector(),
            knockout_phase: default_knockout_phase(),
            group_phase: default_group_phase(),
            group_heading_pattern: default_group_heading_pattern(),
            max_sibling_hops: default_max_sibling_hops(),
            matches_marker: default_matches_marker(),
            header_labels: default_header_labels(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TournamentConfig {
    #[serde(default)]
    pub base_url: Option<String>,
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config: AppConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_newest_year() -> i32 {
    2024
}

fn default_oldest_year() -> i32 {
    2014
}

fn default_knockout_selector() -> String {
    "table.collapsible.vevent.plainlist".to_string()
}

fn default_knockout_phase() -> String {
    DEFAULT_KNOCKOUT_PHASE.to_string()
}

fn default_group_phase() -> String {
    DEFAULT_GROUP_PHASE.to_string()
}

fn default_group_heading_pattern() -> String {
    r"(?i)\bgrupo\s+\w+".to_string()
}

fn default_max_sibling_hops() -> usize {
    12
}

fn default_matches_marker() -> String {
    "Partidos".to_string()
}

fn default_header_labels() -> Vec<String> {
    vec![
        "fecha".to_string(),
        "local".to_string(),
        "date".to_string(),
        "home".to_string(),
    ]
}

use crate::config::{AppConfig, Tournament, YearRange};
use crate::export::{join_with_locations, write_analysis_csv};
use crate::fetch::DocumentSource;
use crate::html::parse_document;
use crate::mapping::{build_team_lookup, load_city_mappings};
use crate::model::{MatchRecord, ProcessReport, RunReport, YearReport};
use crate::parser::{MatchParser, ParsedDocument};
use crate::store::{load_matches, save_matches, write_team_list};
use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const MISSING_TEAMS_SHOWN: usize = 10;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub tournament: Tournament,
    pub config: AppConfig,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub tournament: Tournament,
    pub data_dir: PathBuf,
    pub mapping_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TeamsOptions {
    pub tournament: Tournament,
    pub data_dir: PathBuf,
}

pub fn raw_matches_path(data_dir: &Path, tournament: Tournament) -> PathBuf {
    data_dir.join("raw").join(tournament.matches_file_name())
}

pub fn analysis_path(data_dir: &Path, tournament: Tournament) -> PathBuf {
    data_dir
        .join("processed")
        .join(tournament.analysis_file_name())
}

pub fn team_list_path(data_dir: &Path, tournament: Tournament) -> PathBuf {
    data_dir.join("raw").join(tournament.teams_file_name())
}

pub fn city_mapping_path(data_dir: &Path) -> PathBuf {
    data_dir.join("mappings").join("city_mappings.json")
}

pub fn scrape_tournament(options: &ScrapeOptions) -> Result<RunReport> {
    options.config.validate()?;
    let parser = MatchParser::new(&options.config.extract)?;
    let source = DocumentSource::from_config(&options.config.fetch)?;
    let base_url = options.config.base_url(options.tournament);

    info!(
        tournament = %options.tournament,
        newest = options.config.years.newest,
        oldest = options.config.years.oldest,
        "scrape start"
    );

    let (matches, years) = collect_matches(
        &source,
        &parser,
        options.tournament,
        &base_url,
        options.config.years,
    );

    let output_path = raw_matches_path(&options.data_dir, options.tournament);
    save_matches(&output_path, &matches)?;

    if matches.is_empty() {
        warn!(
            tournament = %options.tournament,
            file = %output_path.display(),
            "no matches were scraped; wrote empty match list"
        );
    } else {
        info!(
            tournament = %options.tournament,
            matches = matches.len(),
            file = %output_path.display(),
            "match list written"
        );
    }

    Ok(RunReport {
        tournament: options.tournament.key().to_string(),
        total_matches: matches.len(),
        years,
        output_path,
    })
}

pub fn collect_matches(
    source: &DocumentSource,
    parser: &MatchParser,
    tournament: Tournament,
    base_url: &str,
    years: YearRange,
) -> (Vec<MatchRecord>, Vec<YearReport>) {
    let mut matches = Vec::new();
    let mut reports = Vec::new();

    for year in years.descending() {
        let mut report = YearReport {
            year,
            url: format!("{base_url}{year}"),
            ..YearReport::default()
        };
        info!(year, url = %report.url, "scraping year");

        match scrape_year(source, parser, tournament, base_url, year) {
            Ok(parsed) => {
                report.group_matches = parsed.group.len();
                report.knockout_matches = parsed.knockout.len();
                info!(
                    year,
                    group = report.group_matches,
                    knockout = report.knockout_matches,
                    "year parsed"
                );
                matches.extend(parsed.into_records());
            }
            Err(err) => {
                warn!(year, url = %report.url, error = %format!("{err:#}"), "skipping year");
                report.error = Some(format!("{err:#}"));
            }
        }

        reports.push(report);
    }

    (matches, reports)
}

pub fn scrape_year(
    source: &DocumentSource,
    parser: &MatchParser,
    tournament: Tournament,
    base_url: &str,
    year: i32,
) -> Result<ParsedDocument> {
    let fetched = source.fetch_year(tournament, base_url, year)?;
    let doc = parse_document(&fetched.body)
        .with_context(|| format!("document from {} is empty", fetched.source_url))?;
    Ok(parser.parse_document(&doc, year))
}

pub fn process_tournament(options: &ProcessOptions) -> Result<ProcessReport> {
    let mapping_path = options
        .mapping_path
        .clone()
        .unwrap_or_else(|| city_mapping_path(&options.data_dir));
    let cities = load_city_mappings(&mapping_path)?;
    if cities.is_empty() {
        bail!("city mapping file {} has no cities", mapping_path.display());
    }

    let raw_path = raw_matches_path(&options.data_dir, options.tournament);
    let matches = load_matches(&raw_path)?;

    let lookup = build_team_lookup(&cities);
    info!(
        matches = matches.len(),
        cities = lookup.cities,
        teams = lookup.teams.len(),
        "loaded matches and city mappings"
    );

    let joined = join_with_locations(&matches, &lookup);
    report_missing_teams(&joined.missing_teams);

    if joined.rows.is_empty() {
        bail!(
            "no matches could be joined with {}; check the mapping file",
            mapping_path.display()
        );
    }

    let output_path = analysis_path(&options.data_dir, options.tournament);
    write_analysis_csv(&output_path, &joined.rows)?;
    info!(
        rows = joined.rows.len(),
        file = %output_path.display(),
        "altitude analysis written"
    );

    Ok(ProcessReport {
        matches_loaded: matches.len(),
        teams_mapped: lookup.teams.len(),
        rows_written: joined.rows.len(),
        missing_teams: joined.missing_teams.into_iter().collect(),
        output_path,
    })
}

fn report_missing_teams(missing: &BTreeSet<String>) {
    if missing.is_empty() {
        return;
    }

    warn!(
        count = missing.len(),
        "teams are missing from the city mapping file"
    );
    for team in missing.iter().take(MISSING_TEAMS_SHOWN) {
        warn!(team = %team, "unmapped team");
    }
    if missing.len() > MISSING_TEAMS_SHOWN {
        warn!(
            more = missing.len() - MISSING_TEAMS_SHOWN,
            "additional unmapped teams not shown"
        );
    }
}

pub fn list_teams(options: &TeamsOptions) -> Result<Vec<String>> {
    let raw_path = raw_matches_path(&options.data_dir, options.tournament);
    let matches = load_matches(&raw_path)?;

    let teams: BTreeSet<String> = matches
        .iter()
        .flat_map(|m| [m.home_team.trim(), m.away_team.trim()])
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect();
    let teams: Vec<String> = teams.into_iter().collect();

    if teams.is_empty() {
        warn!(file = %raw_path.display(), "no teams found in match file");
        return Ok(teams);
    }

    let output_path = team_list_path(&options.data_dir, options.tournament);
    write_team_list(&output_path, &teams)?;
    info!(
        teams = teams.len(),
        file = %output_path.display(),
        "unique team list written"
    );

    Ok(teams)
}

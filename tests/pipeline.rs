use anyhow::Result;
use copa_scrape::config::{AppConfig, FetchConfig, FetchMode, Tournament, YearRange, load_config};
use copa_scrape::mapping::{build_team_lookup, load_city_mappings};
use copa_scrape::pipeline::{
    ProcessOptions, ScrapeOptions, TeamsOptions, analysis_path, city_mapping_path, list_teams,
    process_tournament, raw_matches_path, scrape_tournament, team_list_path,
};
use copa_scrape::store::load_matches;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const KNOCKOUT_ONLY_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<h2><span class="mw-headline">Final</span></h2>
<table class="collapsible vevent plainlist">
<tr><td>11 de noviembre</td><td>Palmeiras</td><td>1:0</td><td>Flamengo</td><td>Estadio Centenario, Montevideo</td></tr>
</table>
</body></html>"#;

#[test]
fn scrape_skips_failing_years_and_keeps_the_rest() -> Result<()> {
    let env = setup_fixture_env()?;
    write_page(&env.pages_dir, Tournament::Libertadores, 2023, KNOCKOUT_ONLY_PAGE)?;

    let report = scrape_tournament(&scrape_options(&env, 2024, 2023))?;

    assert_eq!(report.total_matches, 1);
    assert_eq!(report.years.len(), 2);
    assert_eq!(report.years[0].year, 2024);
    assert!(report.years[0].error.is_some());
    assert_eq!(report.years[1].year, 2023);
    assert_eq!(report.years[1].error, None);
    assert_eq!(report.years[1].knockout_matches, 1);
    assert_eq!(report.failed_years(), vec![2024]);

    let matches = load_matches(&raw_matches_path(&env.data_dir, Tournament::Libertadores))?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].year, 2023);
    assert_eq!(matches[0].phase, "Final");
    assert_eq!(matches[0].home_team, "Palmeiras");
    assert_eq!(matches[0].stadium.as_deref(), Some("Estadio Centenario"));

    Ok(())
}

#[test]
fn scrape_without_any_page_writes_an_empty_list() -> Result<()> {
    let env = setup_fixture_env()?;

    let report = scrape_tournament(&scrape_options(&env, 2024, 2024))?;
    assert_eq!(report.total_matches, 0);
    assert_eq!(report.failed_years(), vec![2024]);

    let path = raw_matches_path(&env.data_dir, Tournament::Libertadores);
    assert_eq!(fs::read_to_string(&path)?.trim(), "[]");
    assert!(load_matches(&path)?.is_empty());

    Ok(())
}

#[test]
fn empty_pages_count_as_failed_years() -> Result<()> {
    let env = setup_fixture_env()?;
    write_page(&env.pages_dir, Tournament::Sudamericana, 2019, "   \n")?;

    let mut options = scrape_options(&env, 2019, 2019);
    options.tournament = Tournament::Sudamericana;
    let report = scrape_tournament(&options)?;

    assert_eq!(report.total_matches, 0);
    let error = report.years[0].error.as_deref().unwrap_or_default();
    assert!(error.contains("empty"), "unexpected error: {error}");

    Ok(())
}

#[test]
fn process_joins_matches_with_city_altitudes() -> Result<()> {
    let env = setup_fixture_env()?;
    scrape_fixture_page(&env)?;

    let report = process_tournament(&ProcessOptions {
        tournament: Tournament::Libertadores,
        data_dir: env.data_dir.clone(),
        mapping_path: None,
    })?;

    assert_eq!(report.matches_loaded, 7);
    assert_eq!(report.teams_mapped, 13);
    assert_eq!(report.rows_written, 4);
    assert_eq!(
        report.missing_teams,
        vec![
            "Atlético Mineiro".to_string(),
            "Deportivo Cali".to_string(),
            "Deportivo Táchira".to_string(),
        ]
    );
    assert_eq!(
        report.output_path,
        analysis_path(&env.data_dir, Tournament::Libertadores)
    );

    let csv = fs::read_to_string(&report.output_path)?;
    assert!(csv.starts_with('\u{feff}'));
    let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(
        lines[0],
        "year,phase,date,home_team,home_city,home_altitude_meters,away_team,away_city,\
         away_altitude_meters,altitude_difference,home_goals,away_goals,score_raw,stadium"
    );
    assert_eq!(
        lines[1],
        "2023,Grupo A,5 de abril,River Plate,Buenos Aires,25,Peñarol,Montevideo,43,-18,2,1,2:1,\
         Estadio Monumental"
    );
    assert_eq!(
        lines[2],
        "2023,Grupo A,6 de abril,The Strongest,La Paz,3640,Bahia,Salvador,8.5,3631.5,3,0,3–0,\
         Estadio Hernando Siles"
    );
    assert_eq!(lines.len(), 5);
    assert!(lines[4].contains("2:2 (3:5 p.)"));

    Ok(())
}

#[test]
fn process_fails_without_mapping_or_matches() -> Result<()> {
    let env = setup_fixture_env()?;

    let missing_matches = process_tournament(&ProcessOptions {
        tournament: Tournament::Sudamericana,
        data_dir: env.data_dir.clone(),
        mapping_path: None,
    });
    assert!(missing_matches.is_err());

    scrape_fixture_page(&env)?;
    let missing_mapping = process_tournament(&ProcessOptions {
        tournament: Tournament::Libertadores,
        data_dir: env.data_dir.clone(),
        mapping_path: Some(env.root.join("nowhere.json")),
    });
    assert!(missing_mapping.is_err());

    Ok(())
}

#[test]
fn process_fails_when_nothing_joins() -> Result<()> {
    let env = setup_fixture_env()?;
    scrape_fixture_page(&env)?;

    let mapping = env.root.join("tiny_mapping.json");
    fs::write(&mapping, r#"{"Quito": {"altitude": 2850, "teams": ["LDU Quito"]}}"#)?;

    let result = process_tournament(&ProcessOptions {
        tournament: Tournament::Libertadores,
        data_dir: env.data_dir.clone(),
        mapping_path: Some(mapping),
    });
    assert!(result.is_err());
    assert!(!analysis_path(&env.data_dir, Tournament::Libertadores).exists());

    Ok(())
}

#[test]
fn malformed_mapping_entries_are_skipped() -> Result<()> {
    let env = setup_fixture_env()?;

    let cities = load_city_mappings(&city_mapping_path(&env.data_dir))?;
    let lookup = build_team_lookup(&cities);

    assert_eq!(lookup.cities, 9);
    assert_eq!(lookup.malformed.len(), 3);
    assert!(lookup.get("Deportivo Cali").is_none());
    assert!(lookup.get("Atlético Mineiro").is_none());
    assert!(lookup.get("Deportivo Táchira").is_none());

    let strongest = lookup.get("The Strongest").expect("The Strongest is mapped");
    assert_eq!(strongest.city, "La Paz");
    assert_eq!(strongest.altitude, 3640.0);

    Ok(())
}

#[test]
fn team_list_is_sorted_and_unique() -> Result<()> {
    let env = setup_fixture_env()?;
    scrape_fixture_page(&env)?;

    let teams = list_teams(&TeamsOptions {
        tournament: Tournament::Libertadores,
        data_dir: env.data_dir.clone(),
    })?;

    assert_eq!(
        teams,
        vec![
            "Atlético Mineiro",
            "Bahia",
            "Deportivo Cali",
            "Deportivo Táchira",
            "Estudiantes (LP)",
            "Independiente Medellín",
            "Peñarol",
            "River Plate",
            "The Strongest",
        ]
    );

    let content = fs::read_to_string(team_list_path(&env.data_dir, Tournament::Libertadores))?;
    assert_eq!(content.lines().count(), teams.len());
    assert!(content.starts_with("Atlético Mineiro\n"));

    Ok(())
}

#[test]
fn match_files_accept_string_goals_and_legacy_score_key() -> Result<()> {
    let env = setup_fixture_env()?;
    let path = env.root.join("legacy.json");
    fs::write(
        &path,
        r#"[{
            "year": 2016,
            "phase": "Grupo 3",
            "date": null,
            "home_team": "Atlético Nacional",
            "away_team": "Huracán",
            "score": "2:0",
            "home_goals": "2",
            "away_goals": 0,
            "stadium": null
        }]"#,
    )?;

    let matches = load_matches(&path)?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].score_raw, "2:0");
    assert_eq!((matches[0].home_goals, matches[0].away_goals), (2, 0));

    Ok(())
}

#[test]
fn match_files_skip_records_with_null_goals() -> Result<()> {
    let env = setup_fixture_env()?;
    let raw_path = raw_matches_path(&env.data_dir, Tournament::Libertadores);
    fs::create_dir_all(env.data_dir.join("raw"))?;
    fs::write(
        &raw_path,
        r#"[
  {"year": 2017, "phase": "Final", "date": "22 de noviembre", "home_team": "Lanús", "away_team": "Grêmio", "score_raw": "1:2", "home_goals": 1, "away_goals": 2, "stadium": "Estadio Ciudad de Lanús"},
  {"year": 2017, "phase": "Semifinales", "date": null, "home_team": "Barcelona", "away_team": "Grêmio", "score_raw": "Suspendido", "home_goals": null, "away_goals": null, "stadium": null}
]"#,
    )?;

    let matches = load_matches(&raw_path)?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].home_team, "Lanús");
    assert_eq!((matches[0].home_goals, matches[0].away_goals), (1, 2));

    let teams = list_teams(&TeamsOptions {
        tournament: Tournament::Libertadores,
        data_dir: env.data_dir.clone(),
    })?;
    assert_eq!(teams, vec!["Grêmio", "Lanús"]);

    Ok(())
}

#[test]
fn config_file_overrides_defaults() -> Result<()> {
    let env = setup_fixture_env()?;

    let defaults = load_config(&env.root.join("missing.toml"))?;
    assert_eq!(defaults.years.newest, 2024);
    assert_eq!(defaults.years.oldest, 2014);
    assert_eq!(defaults.fetch.timeout_secs, 10);
    assert_eq!(
        defaults.base_url(Tournament::Sudamericana),
        "https://es.wikipedia.org/wiki/Copa_Sudamericana_"
    );

    let path = env.root.join("copa_scrape.toml");
    fs::write(
        &path,
        r#"
[fetch]
mode = "file"
file_dir = "pages"

[years]
newest = 2020
oldest = 2018

[extract]
group_phase = "Group Stage"

[tournaments.Libertadores]
base_url = "https://example.org/wiki/Libertadores_"
"#,
    )?;
    let config = load_config(&path)?;
    assert_eq!(config.fetch.mode, FetchMode::File);
    assert_eq!(
        config.years.descending().collect::<Vec<_>>(),
        vec![2020, 2019, 2018]
    );
    assert_eq!(config.extract.group_phase, "Group Stage");
    assert_eq!(config.extract.knockout_phase, "Fase Final");
    assert_eq!(
        config.base_url(Tournament::Libertadores),
        "https://example.org/wiki/Libertadores_"
    );

    Ok(())
}

#[test]
fn invalid_config_files_are_rejected() -> Result<()> {
    let env = setup_fixture_env()?;

    let cases = [
        "[years]\nnewest = 2010\noldest = 2020\n",
        "[fetch]\ntimeout_secs = 0\n",
        "[fetch]\nmode = \"file\"\n",
        "[tournaments.mundial]\n",
        "[tournaments.sudamericana]\nbase_url = \"not a url\"\n",
    ];
    for (idx, case) in cases.iter().enumerate() {
        let path = env.root.join(format!("bad_{idx}.toml"));
        fs::write(&path, case)?;
        assert!(load_config(&path).is_err(), "case {idx} should be rejected");
    }

    Ok(())
}

#[test]
fn tournament_keys_are_case_insensitive() {
    assert_eq!(
        Tournament::from_key("Libertadores"),
        Some(Tournament::Libertadores)
    );
    assert_eq!(
        Tournament::from_key(" SUDAMERICANA "),
        Some(Tournament::Sudamericana)
    );
    assert_eq!(Tournament::from_key("mundial"), None);
    assert_eq!(
        Tournament::Sudamericana.matches_file_name(),
        "sudamericana_matches.json"
    );
}

struct FixtureEnv {
    root: PathBuf,
    data_dir: PathBuf,
    pages_dir: PathBuf,
}

fn setup_fixture_env() -> Result<FixtureEnv> {
    let temp = tempdir()?;
    let root = temp.keep();

    let fixture_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let data_dir = root.join("data");
    let pages_dir = root.join("pages");
    fs::create_dir_all(&pages_dir)?;

    let mapping = city_mapping_path(&data_dir);
    if let Some(parent) = mapping.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(fixture_root.join("city_mappings.json"), mapping)?;

    Ok(FixtureEnv {
        root,
        data_dir,
        pages_dir,
    })
}

fn scrape_options(env: &FixtureEnv, newest: i32, oldest: i32) -> ScrapeOptions {
    ScrapeOptions {
        tournament: Tournament::Libertadores,
        config: AppConfig {
            fetch: FetchConfig {
                mode: FetchMode::File,
                file_dir: Some(env.pages_dir.clone()),
                ..FetchConfig::default()
            },
            years: YearRange { newest, oldest },
            ..AppConfig::default()
        },
        data_dir: env.data_dir.clone(),
    }
}

fn scrape_fixture_page(env: &FixtureEnv) -> Result<()> {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join("libertadores_2023.html");
    let page = fs::read_to_string(fixture)?;
    write_page(&env.pages_dir, Tournament::Libertadores, 2023, &page)?;
    scrape_tournament(&scrape_options(env, 2023, 2023))?;
    Ok(())
}

fn write_page(pages_dir: &Path, tournament: Tournament, year: i32, html: &str) -> Result<()> {
    let dir = pages_dir.join(tournament.key());
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(format!("{year}.html")), html)?;
    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use copa_scrape::config::{Tournament, load_config};
use copa_scrape::pipeline::{
    ProcessOptions, ScrapeOptions, TeamsOptions, list_teams, process_tournament, scrape_tournament,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "copa-scrape",
    about = "Scrapes Copa Libertadores / Sudamericana results and joins them with city altitudes"
)]
struct Cli {
    #[arg(long, default_value = "configs/copa_scrape.toml")]
    config: PathBuf,

    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Scrape {
        #[arg(value_enum, ignore_case = true)]
        tournament: Tournament,
    },
    Process {
        #[arg(value_enum, ignore_case = true)]
        tournament: Tournament,
        #[arg(long)]
        mappings: Option<PathBuf>,
    },
    Teams {
        #[arg(value_enum, ignore_case = true)]
        tournament: Tournament,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape { tournament } => {
            let config = load_config(&cli.config)?;
            let report = scrape_tournament(&ScrapeOptions {
                tournament,
                config,
                data_dir: cli.data_dir,
            })?;

            for year in &report.years {
                info!(
                    year = year.year,
                    matches = year.total(),
                    group = year.group_matches,
                    knockout = year.knockout_matches,
                    failed = year.error.is_some(),
                    "year summary"
                );
            }
            info!(
                tournament = %tournament.display_name(),
                matches = report.total_matches,
                failed_years = ?report.failed_years(),
                file = %report.output_path.display(),
                "scrape complete"
            );
        }
        Commands::Process {
            tournament,
            mappings,
        } => {
            let report = process_tournament(&ProcessOptions {
                tournament,
                data_dir: cli.data_dir,
                mapping_path: mappings,
            })?;
            info!(
                tournament = %tournament.display_name(),
                matches = report.matches_loaded,
                teams_mapped = report.teams_mapped,
                rows = report.rows_written,
                missing_teams = report.missing_teams.len(),
                file = %report.output_path.display(),
                "processing complete"
            );
        }
        Commands::Teams { tournament } => {
            let teams = list_teams(&TeamsOptions {
                tournament,
                data_dir: cli.data_dir,
            })?;
            info!(
                tournament = %tournament.display_name(),
                teams = teams.len(),
                "team listing complete"
            );
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}

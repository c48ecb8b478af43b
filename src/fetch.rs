use crate::config::{FetchConfig, FetchMode, Tournament};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source_url: String,
    pub body: Vec<u8>,
}

pub enum DocumentSource {
    Http { client: Client },
    File { dir: PathBuf },
}

impl DocumentSource {
    pub fn from_config(fetch: &FetchConfig) -> Result<Self> {
        match fetch.mode {
            FetchMode::Http => {
                let mut headers = HeaderMap::new();
                headers.insert(
                    USER_AGENT,
                    HeaderValue::from_str(&fetch.user_agent)
                        .context("invalid fetch.user_agent header value")?,
                );
                let client = Client::builder()
                    .timeout(Duration::from_secs(fetch.timeout_secs))
                    .default_headers(headers)
                    .build()
                    .context("failed to build reqwest client")?;
                Ok(DocumentSource::Http { client })
            }
            FetchMode::File => {
                let dir = fetch
                    .file_dir
                    .clone()
                    .context("fetch.file_dir missing for file mode")?;
                Ok(DocumentSource::File { dir })
            }
        }
    }

    pub fn fetch_year(
        &self,
        tournament: Tournament,
        base_url: &str,
        year: i32,
    ) -> Result<FetchedDocument> {
        match self {
            DocumentSource::Http { client } => {
                let url = year_url(base_url, year)?;
                fetch_http(client, &url)
            }
            DocumentSource::File { dir } => {
                let path = dir.join(tournament.key()).join(format!("{year}.html"));
                let body = std::fs::read(&path)
                    .with_context(|| format!("failed to read page file {}", path.display()))?;
                debug!(file = %path.display(), bytes = body.len(), "loaded page file");
                Ok(FetchedDocument {
                    source_url: format!("file://{}", path.display()),
                    body,
                })
            }
        }
    }
}

pub fn year_url(base_url: &str, year: i32) -> Result<String> {
    let url = format!("{base_url}{year}");
    Url::parse(&url).with_context(|| format!("invalid page url {url}"))?;
    Ok(url)
}

fn fetch_http(client: &Client, url: &str) -> Result<FetchedDocument> {
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("request to {url} failed"))?;

    let status = resp.status();
    if !status.is_success() {
        bail!("request to {url} failed with status {status}");
    }

    let body = resp
        .bytes()
        .with_context(|| format!("failed to read response body from {url}"))?
        .to_vec();
    info!(%url, bytes = body.len(), "fetched page");

    Ok(FetchedDocument {
        source_url: url.to_string(),
        body,
    })
}

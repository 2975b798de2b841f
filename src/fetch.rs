use std::fs::File;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to write {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Network seam for the pipeline: one GET per detail page, one streamed
/// GET-to-file per poster image.
pub trait Fetch {
    fn page(&self, url: &str) -> Result<String, FetchError>;
    fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(resp)
    }
}

impl Fetch for HttpFetcher {
    fn page(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching page");
        self.get(url)?.text().map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }

    fn download(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        debug!(url, dest = %dest.display(), "downloading");
        let mut resp = self.get(url)?;
        let mut file = File::create(dest).map_err(|source| FetchError::Io {
            path: dest.display().to_string(),
            source,
        })?;
        resp.copy_to(&mut file).map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        Ok(())
    }
}

//! reqwest-backed request/response collaborators: tuner info and spectrum.
//!
//! The control connection and the scan trigger are long-lived channels and
//! are supplied by the embedding application.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use fmdx_proto::config::HttpConfig;
use fmdx_proto::model::{SpectrumPoint, TunerInfo};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::collab::{InfoFetcher, SpectrumFetcher};

/// Spectrum payloads come either as a bare array or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum SpectrumBody {
    Points(Vec<SpectrumPoint>),
    Wrapped {
        #[serde(default)]
        points: Vec<SpectrumPoint>,
    },
}

impl SpectrumBody {
    fn into_points(self) -> Vec<SpectrumPoint> {
        match self {
            SpectrumBody::Points(points) | SpectrumBody::Wrapped { points } => points,
        }
    }
}

#[derive(Clone)]
pub struct HttpCollaborator {
    client: Client,
    info_path: String,
    spectrum_path: String,
}

impl HttpCollaborator {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            info_path: config.info_path.clone(),
            spectrum_path: config.spectrum_path.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, identity: &str) -> Result<T> {
        debug!("http: GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, identity)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("{} returned status: {}", url, response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("Malformed response from {}", url))
    }
}

#[async_trait]
impl InfoFetcher for HttpCollaborator {
    async fn fetch_info(&self, endpoint: &str, identity: &str) -> Result<TunerInfo> {
        let url = join_endpoint(endpoint, &self.info_path)?;
        self.get_json(url, identity).await
    }
}

#[async_trait]
impl SpectrumFetcher for HttpCollaborator {
    async fn fetch_spectrum(&self, endpoint: &str, identity: &str) -> Result<Vec<SpectrumPoint>> {
        let url = join_endpoint(endpoint, &self.spectrum_path)?;
        let body: SpectrumBody = self.get_json(url, identity).await?;
        Ok(body.into_points())
    }
}

/// Append `path` to the endpoint, keeping any path prefix the endpoint has.
pub fn join_endpoint(endpoint: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).with_context(|| format!("Invalid endpoint URL: {}", joined))
}

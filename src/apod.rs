use chrono::NaiveDate;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Default APOD API endpoint.
const DEFAULT_ENDPOINT: &str = "https://api.nasa.gov/planetary/apod";

/// Rate-limited API key NASA hands out for demos and one-off scripts.
const DEMO_API_KEY: &str = "DEMO_KEY";

/// APOD metadata API configuration.
///
/// Passed into [`ApodClient`] at construction, so tests and alternate
/// deployments can point the client elsewhere.
#[derive(Clone, Debug)]
pub struct ApodConfig {
    /// URL of the metadata endpoint.
    pub endpoint: String,

    /// API key sent with every metadata request.
    pub api_key: String,
}

impl Default for ApodConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: DEMO_API_KEY.to_string(),
        }
    }
}

/// One day's APOD metadata, as returned by the API.
///
/// Only `url` is required; the service returns more fields than we use
/// and unknown ones are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ApodInfo {
    /// Location of the day's image (or video, see `media_type`).
    pub url: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// "image" or "video". Missing is treated as "image".
    #[serde(default)]
    pub media_type: Option<String>,

    #[serde(default)]
    pub explanation: Option<String>,
}

impl ApodInfo {
    /// Whether the referenced media is an image that can be downloaded
    /// and cached. Video days have nothing for us to store.
    pub fn is_image(&self) -> bool {
        match self.media_type.as_deref() {
            Some(media_type) => media_type == "image",
            None => true,
        }
    }
}

/// APOD API client.
///
/// Thin collaborator around [`reqwest`]: fetches one day's metadata and
/// downloads the referenced image bytes. No retries; failures surface
/// to the caller.
#[derive(Debug)]
pub struct ApodClient {
    config: ApodConfig,
    reqwest_client: ReqwestClient,
}

impl ApodClient {
    /// Create client with given configuration.
    pub fn new(config: ApodConfig) -> Result<Self> {
        let reqwest_client = ReqwestClient::builder().build()?;
        Ok(Self {
            config,
            reqwest_client,
        })
    }

    /// Fetch APOD metadata for `date`.
    pub async fn fetch_info(&self, date: NaiveDate) -> Result<ApodInfo> {
        debug!("fetching APOD info for {}", date);
        let date = date.to_string();
        let response = self
            .reqwest_client
            .get(&self.config.endpoint)
            .query(&[
                ("api_key", self.config.api_key.as_str()),
                ("date", date.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        trace!("APOD response: {}", body);
        Ok(serde_json::from_str(&body)?)
    }

    /// Download raw bytes from `url`.
    ///
    /// The whole body is buffered: the content fingerprint must be
    /// computed over the complete blob before anything touches disk.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("downloading {}", url);
        let response = self
            .reqwest_client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        debug!("downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

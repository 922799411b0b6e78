use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::nhtsa::api_types::{MakeModelsResponse, VinDecodeResponse};

/// Remote vehicle registry operations.
#[async_trait]
pub trait VehicleApi: Send + Sync {
  /// Decode a VIN into its variable/value list.
  async fn decode_vin(&self, vin: &str) -> Result<VinDecodeResponse>;

  /// Decode a VIN including the extended variable set.
  async fn decode_vin_extended(&self, vin: &str) -> Result<VinDecodeResponse>;

  /// List models the registry knows for a make and model year.
  async fn get_models_for_make_year(&self, make: &str, year: &str) -> Result<MakeModelsResponse>;
}

/// vPIC API client wrapper
#[derive(Clone)]
pub struct NhtsaClient {
  client: reqwest::Client,
  base_url: Url,
}

impl NhtsaClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let base_url = Url::parse(&config.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.base_url, e))?;

    if base_url.cannot_be_a_base() {
      return Err(eyre!("Invalid API base URL {}", config.base_url));
    }

    let client = reqwest::Client::builder()
      .user_agent(config.user_agent.as_str())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, base_url })
  }

  /// Build `{base}/{segments...}?format=json`, percent-encoding each segment.
  fn endpoint(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| eyre!("Invalid API base URL {}", self.base_url))?
      .pop_if_empty()
      .extend(segments);
    url.query_pairs_mut().append_pair("format", "json");
    Ok(url)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
    debug!(%url, "GET");

    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?
      .error_for_status()
      .map_err(|e| eyre!("Request to {} failed: {}", url, e))?;

    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to parse response from {}: {}", url, e))
  }
}

#[async_trait]
impl VehicleApi for NhtsaClient {
  async fn decode_vin(&self, vin: &str) -> Result<VinDecodeResponse> {
    let url = self.endpoint(&["vehicles", "DecodeVin", vin])?;
    self.get_json(url).await
  }

  async fn decode_vin_extended(&self, vin: &str) -> Result<VinDecodeResponse> {
    let url = self.endpoint(&["vehicles", "DecodeVinExtended", vin])?;
    self.get_json(url).await
  }

  async fn get_models_for_make_year(&self, make: &str, year: &str) -> Result<MakeModelsResponse> {
    let url = self.endpoint(&[
      "vehicles",
      "GetModelsForMakeYear",
      "make",
      make,
      "modelyear",
      year,
    ])?;
    self.get_json(url).await
  }
}

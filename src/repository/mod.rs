//! Offline-first access to decoded VINs.
//!
//! Decodes always try the registry first. Successful results are written to
//! the local store; when the registry call fails the last stored copy of
//! that VIN is served instead.

mod result;

use color_eyre::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::nhtsa::{ModelResult, VehicleApi, VehicleInfo};
use crate::store::{DecodedVin, Subscription, VinStorage};
use crate::vin::normalize_vin;

pub use result::{CacheResult, CacheSource};

/// Which decode endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeMode {
  Standard,
  Extended,
}

/// VIN repository combining the registry client with the local store.
pub struct VinRepository<S: VinStorage> {
  api: Arc<dyn VehicleApi>,
  storage: Arc<S>,
  /// Carry the favorite flag over when a stored VIN is decoded again
  preserve_favorites: bool,
}

impl<S: VinStorage + 'static> VinRepository<S> {
  pub fn new(api: Arc<dyn VehicleApi>, storage: Arc<S>) -> Self {
    Self {
      api,
      storage,
      preserve_favorites: false,
    }
  }

  pub fn with_preserve_favorites(mut self, preserve: bool) -> Self {
    self.preserve_favorites = preserve;
    self
  }

  /// Decode a VIN, falling back to the cached copy if the registry fails.
  pub async fn decode_vin(&self, vin: &str) -> Result<CacheResult<VehicleInfo>> {
    self.decode(vin, DecodeMode::Standard).await
  }

  /// Like `decode_vin`, using the extended decode endpoint.
  pub async fn decode_vin_extended(&self, vin: &str) -> Result<CacheResult<VehicleInfo>> {
    self.decode(vin, DecodeMode::Extended).await
  }

  async fn decode(&self, vin: &str, mode: DecodeMode) -> Result<CacheResult<VehicleInfo>> {
    let vin = normalize_vin(vin);

    match self.fetch_and_store(&vin, mode).await {
      Ok(info) => Ok(CacheResult::from_network(info)),
      Err(err) => {
        warn!(%vin, error = %err, "VIN decode failed, trying local cache");

        match self.storage.get_vin(&vin) {
          Ok(Some(cached)) => {
            info!(%vin, "Serving cached VIN");
            let cached_at = cached.created_at();
            Ok(CacheResult::offline(cached.vehicle, cached_at))
          }
          Ok(None) => {
            warn!(%vin, "No cached data for VIN");
            Err(err)
          }
          Err(lookup_err) => {
            warn!(%vin, error = %lookup_err, "Cache lookup failed");
            Err(err)
          }
        }
      }
    }
  }

  async fn fetch_and_store(&self, vin: &str, mode: DecodeMode) -> Result<VehicleInfo> {
    info!(%vin, ?mode, "Decoding VIN");

    let response = match mode {
      DecodeMode::Standard => self.api.decode_vin(vin).await?,
      DecodeMode::Extended => self.api.decode_vin_extended(vin).await?,
    };

    debug!(
      count = response.count,
      message = %response.message,
      results = response.results.len(),
      "Decode response received"
    );

    let info = VehicleInfo::from_results(vin, &response.results);
    debug!(%vin, vehicle = %info.display_name(), "Parsed vehicle");

    let is_favorite = if self.preserve_favorites {
      self
        .storage
        .get_vin(vin)?
        .map(|existing| existing.is_favorite)
        .unwrap_or(false)
    } else {
      false
    };

    self
      .storage
      .insert_vin(&DecodedVin::new(info.clone(), is_favorite))?;

    Ok(info)
  }

  /// Models the registry lists for a make and year. Not cached.
  pub async fn get_models_for_make_year(&self, make: &str, year: &str) -> Result<Vec<ModelResult>> {
    info!(%make, %year, "Fetching models");

    let response = self
      .api
      .get_models_for_make_year(make, year)
      .await
      .inspect_err(|e| warn!(%make, %year, error = %e, "Model lookup failed"))?;

    debug!(count = response.count, "Models received");
    Ok(response.results)
  }

  /// Cached record for a VIN, without touching the network.
  pub fn get_cached_vin(&self, vin: &str) -> Result<Option<DecodedVin>> {
    self.storage.get_vin(&normalize_vin(vin))
  }

  pub fn get_all_vins(&self) -> Result<Vec<DecodedVin>> {
    self.storage.get_all_vins()
  }

  pub fn get_favorite_vins(&self) -> Result<Vec<DecodedVin>> {
    self.storage.get_favorite_vins()
  }

  pub fn search_vins(&self, query: &str) -> Result<Vec<DecodedVin>> {
    self.storage.search_vins(query)
  }

  pub fn get_vin_count(&self) -> Result<usize> {
    self.storage.count()
  }

  /// Set the favorite flag. Unknown VINs are ignored.
  pub fn toggle_favorite(&self, vin: &str, is_favorite: bool) -> Result<bool> {
    self.storage.update_favorite(vin, is_favorite)
  }

  /// Delete a stored record.
  pub fn delete_vin(&self, record: &DecodedVin) -> Result<bool> {
    self.storage.delete_vin(record.vin())
  }

  pub fn delete_vin_by_value(&self, vin: &str) -> Result<bool> {
    self.storage.delete_vin(vin)
  }

  /// Clear the whole history.
  pub fn delete_all(&self) -> Result<usize> {
    self.storage.delete_all()
  }

  /// Live view of the full history.
  pub fn observe_all(&self) -> Subscription<S, Vec<DecodedVin>> {
    Subscription::new(Arc::clone(&self.storage), |s: &S| s.get_all_vins())
  }

  /// Live view of favorites.
  pub fn observe_favorites(&self) -> Subscription<S, Vec<DecodedVin>> {
    Subscription::new(Arc::clone(&self.storage), |s: &S| s.get_favorite_vins())
  }

  /// Live view of a search.
  pub fn observe_search(&self, query: &str) -> Subscription<S, Vec<DecodedVin>> {
    let query = query.to_string();
    Subscription::new(Arc::clone(&self.storage), move |s: &S| {
      s.search_vins(&query)
    })
  }

  /// Live view of a single VIN.
  pub fn observe_vin(&self, vin: &str) -> Subscription<S, Option<DecodedVin>> {
    let vin = normalize_vin(vin);
    Subscription::new(Arc::clone(&self.storage), move |s: &S| s.get_vin(&vin))
  }
}

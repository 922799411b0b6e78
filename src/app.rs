use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use serde_json::json;
use std::sync::Arc;

use crate::config::Config;
use crate::nhtsa::{NhtsaClient, VehicleInfo};
use crate::output;
use crate::repository::VinRepository;
use crate::store::{DecodedVin, SqliteStorage, Subscription, VinStorage};
use crate::vin::{is_valid_vin, normalize_vin_input};

/// User-facing operations. Each returns the text to print.
pub struct App<S: VinStorage> {
  repo: VinRepository<S>,
  /// Print records as JSON instead of text
  json: bool,
}

impl App<SqliteStorage> {
  /// Wire up the registry client and the on-disk store from configuration.
  pub fn new(config: &Config) -> Result<Self> {
    let api = Arc::new(NhtsaClient::new(&config.api)?);
    let storage = Arc::new(SqliteStorage::open(&config.database_path()?)?);
    let repo =
      VinRepository::new(api, storage).with_preserve_favorites(config.cache.preserve_favorites);

    Ok(Self::with_repository(repo))
  }
}

impl<S: VinStorage + 'static> App<S> {
  pub fn with_repository(repo: VinRepository<S>) -> Self {
    Self { repo, json: false }
  }

  pub fn with_json(mut self, json: bool) -> Self {
    self.json = json;
    self
  }

  /// Clean up user input and insist on a well-formed VIN.
  fn parse_vin(input: &str) -> Result<String> {
    let vin = normalize_vin_input(input);
    if !is_valid_vin(&vin) {
      return Err(eyre!("VIN must be exactly 17 characters"));
    }
    Ok(vin)
  }

  pub async fn decode(&self, input: &str, extended: bool) -> Result<String> {
    let vin = Self::parse_vin(input)?;

    let result = if extended {
      self.repo.decode_vin_extended(&vin).await?
    } else {
      self.repo.decode_vin(&vin).await?
    };

    let is_favorite = self
      .repo
      .get_cached_vin(&vin)?
      .is_some_and(|r| r.is_favorite);

    if self.json {
      return output::to_json(&json!({
        "source": if result.is_offline() { "offline" } else { "network" },
        "cached_at": result.cached_at,
        "is_favorite": is_favorite,
        "vehicle": result.data,
      }));
    }

    let mut out = String::new();
    if result.is_offline() {
      let when = result
        .cached_at
        .map(|t| output::relative_time(t.timestamp_millis(), Utc::now()))
        .unwrap_or_else(|| "earlier".to_string());
      out.push_str(&format!(
        "Registry unavailable, showing cached result ({})\n\n",
        when
      ));
    }
    out.push_str(&output::vehicle_detail(&result.data, is_favorite));
    out.push_str(&self.other_models(&result.data).await);
    Ok(out)
  }

  /// Detail view of a stored VIN. The record itself is read locally; only
  /// the related models list goes to the registry.
  pub async fn show(&self, input: &str) -> Result<String> {
    let vin = normalize_vin_input(input);
    let record = self
      .repo
      .get_cached_vin(&vin)?
      .ok_or_else(|| eyre!("{} is not in history", vin))?;

    if self.json {
      return output::to_json(&record);
    }
    let mut out = output::vehicle_detail(&record.vehicle, record.is_favorite);
    out.push_str(&self.other_models(&record.vehicle).await);
    Ok(out)
  }

  /// Other models of the same make and year. Empty when either is unknown.
  async fn other_models(&self, vehicle: &VehicleInfo) -> String {
    let (Some(make), Some(year)) = (&vehicle.make, &vehicle.year) else {
      return String::new();
    };

    let models = self.repo.get_models_for_make_year(make, year).await;
    output::other_models_section(&models, vehicle.model.as_deref())
  }

  pub fn history(&self, search: Option<&str>, favorites_only: bool) -> Result<String> {
    let search = search.map(str::trim).filter(|q| !q.is_empty());

    let records: Vec<DecodedVin> = match (search, favorites_only) {
      (Some(q), true) => self
        .repo
        .search_vins(q)?
        .into_iter()
        .filter(|r| r.is_favorite)
        .collect(),
      (Some(q), false) => self.repo.search_vins(q)?,
      (None, true) => self.repo.get_favorite_vins()?,
      (None, false) => self.repo.get_all_vins()?,
    };

    if self.json {
      return output::to_json(&records);
    }

    if records.is_empty() {
      return Ok(match (search, favorites_only) {
        (Some(q), _) => format!("No VINs match '{}'", q),
        (None, true) => "No favorites yet".to_string(),
        (None, false) => "No VINs decoded yet".to_string(),
      });
    }

    Ok(output::history_table(&records, Utc::now()))
  }

  pub fn set_favorite(&self, input: &str, is_favorite: bool) -> Result<String> {
    let vin = normalize_vin_input(input);
    if !self.repo.toggle_favorite(&vin, is_favorite)? {
      return Ok(format!("{} is not in history", vin));
    }

    Ok(if is_favorite {
      format!("★ Added {} to favorites", vin)
    } else {
      format!("Removed {} from favorites", vin)
    })
  }

  pub fn delete(&self, input: &str) -> Result<String> {
    let vin = normalize_vin_input(input);
    if self.repo.delete_vin_by_value(&vin)? {
      Ok(format!("Deleted {}", vin))
    } else {
      Ok(format!("{} is not in history", vin))
    }
  }

  pub fn clear(&self) -> Result<String> {
    let deleted = self.repo.delete_all()?;
    Ok(format!("Deleted {} VINs", deleted))
  }

  pub async fn models(&self, make: &str, year: &str) -> Result<String> {
    let models = self.repo.get_models_for_make_year(make, year).await?;
    if self.json {
      return output::to_json(&models);
    }
    if models.is_empty() {
      return Ok(format!("No models found for {} {}", make, year));
    }
    Ok(output::models_table(&models))
  }

  pub fn count(&self) -> Result<String> {
    Ok(self.repo.get_vin_count()?.to_string())
  }

  pub fn observe_history(&self) -> Subscription<S, Vec<DecodedVin>> {
    self.repo.observe_all()
  }

  pub fn observe_favorites(&self) -> Subscription<S, Vec<DecodedVin>> {
    self.repo.observe_favorites()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ApiConfig;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  const VIN: &str = "1HGBH41JXMN109186";

  fn app_for(server: &MockServer) -> App<SqliteStorage> {
    let api = NhtsaClient::new(&ApiConfig {
      base_url: server.uri(),
      ..Default::default()
    })
    .unwrap();
    let storage = SqliteStorage::open_in_memory().unwrap();
    App::with_repository(VinRepository::new(Arc::new(api), Arc::new(storage)))
  }

  async fn mount_honda(server: &MockServer) {
    Mock::given(method("GET"))
      .and(path(format!("/vehicles/DecodeVin/{}", VIN)))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "Count": 4,
        "Message": "Results returned successfully",
        "Results": [
          {"Value": "HONDA", "Variable": "Make"},
          {"Value": "Accord", "Variable": "Model"},
          {"Value": "2021", "Variable": "Model Year"},
          {"Value": "0", "Variable": "Error Code"}
        ]
      })))
      .mount(server)
      .await;
  }

  #[tokio::test]
  async fn test_decode_rejects_short_input() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let err = app.decode("1HGBH41JXMN10918", false).await.unwrap_err();
    assert_eq!(err.to_string(), "VIN must be exactly 17 characters");
  }

  #[tokio::test]
  async fn test_decode_then_browse() {
    let server = MockServer::start().await;
    mount_honda(&server).await;
    let app = app_for(&server);

    let text = app.decode("1hgb-h41jxmn109186", false).await.unwrap();
    assert!(text.starts_with("2021 HONDA Accord"));

    assert_eq!(app.count().unwrap(), "1");
    assert!(app.show(VIN).await.unwrap().contains("Accord"));
    assert!(app.history(None, false).unwrap().contains(VIN));
    assert!(app.history(Some("accord"), false).unwrap().contains(VIN));
    assert_eq!(app.history(None, true).unwrap(), "No favorites yet");

    assert_eq!(
      app.set_favorite(VIN, true).unwrap(),
      format!("★ Added {} to favorites", VIN)
    );
    assert!(app.history(Some("honda"), true).unwrap().contains(VIN));
    assert!(app.show(VIN).await.unwrap().contains("★"));
  }

  #[tokio::test]
  async fn test_offline_decode_serves_history() {
    let server = MockServer::start().await;
    mount_honda(&server).await;
    let app = app_for(&server);
    app.decode(VIN, false).await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let text = app.decode(VIN, false).await.unwrap();
    assert!(text.starts_with("Registry unavailable"));
    assert!(text.contains("2021 HONDA Accord"));
  }

  #[tokio::test]
  async fn test_json_output() {
    let server = MockServer::start().await;
    mount_honda(&server).await;
    let app = app_for(&server).with_json(true);

    let decoded: serde_json::Value =
      serde_json::from_str(&app.decode(VIN, false).await.unwrap()).unwrap();
    assert_eq!(decoded["source"], "network");
    assert_eq!(decoded["vehicle"]["make"], "HONDA");

    let history: serde_json::Value =
      serde_json::from_str(&app.history(None, false).unwrap()).unwrap();
    assert_eq!(history[0]["vin"], VIN);
    assert_eq!(history[0]["is_favorite"], false);
  }

  #[tokio::test]
  async fn test_detail_lists_other_models() {
    let server = MockServer::start().await;
    mount_honda(&server).await;
    Mock::given(method("GET"))
      .and(path("/vehicles/GetModelsForMakeYear/make/HONDA/modelyear/2021"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "Count": 4,
        "Results": [
          {"Make_ID": 474, "Make_Name": "HONDA", "Model_ID": 1861, "Model_Name": "Accord"},
          {"Make_ID": 474, "Make_Name": "HONDA", "Model_ID": 1863, "Model_Name": "Civic"},
          {"Make_ID": 474, "Make_Name": "HONDA", "Model_ID": 1864, "Model_Name": "Pilot"},
          {"Make_ID": 474, "Make_Name": "HONDA", "Model_ID": 1865, "Model_Name": "Civic"}
        ]
      })))
      .mount(&server)
      .await;
    let app = app_for(&server);

    let decoded = app.decode(VIN, false).await.unwrap();
    assert!(decoded.contains("\nOther Models\n  Civic, Pilot\n"));

    let shown = app.show(VIN).await.unwrap();
    assert!(shown.contains("\nOther Models\n  Civic, Pilot\n"));
  }

  #[tokio::test]
  async fn test_detail_survives_model_lookup_failure() {
    let server = MockServer::start().await;
    mount_honda(&server).await;
    Mock::given(method("GET"))
      .and(path("/vehicles/GetModelsForMakeYear/make/HONDA/modelyear/2021"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;
    let app = app_for(&server);

    let text = app.decode(VIN, false).await.unwrap();
    assert!(text.starts_with("2021 HONDA Accord"));
    assert!(text.contains("Could not load models"));
  }

  #[tokio::test]
  async fn test_show_unknown_vin() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let err = app.show(VIN).await.unwrap_err();
    assert_eq!(err.to_string(), format!("{} is not in history", VIN));
  }

  #[tokio::test]
  async fn test_delete_and_clear() {
    let server = MockServer::start().await;
    mount_honda(&server).await;
    let app = app_for(&server);
    app.decode(VIN, false).await.unwrap();

    assert_eq!(app.delete(VIN).unwrap(), format!("Deleted {}", VIN));
    assert_eq!(
      app.delete(VIN).unwrap(),
      format!("{} is not in history", VIN)
    );
    assert_eq!(app.history(None, false).unwrap(), "No VINs decoded yet");
    assert_eq!(app.clear().unwrap(), "Deleted 0 VINs");
  }

  #[tokio::test]
  async fn test_models_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/vehicles/GetModelsForMakeYear/make/honda/modelyear/1901"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Count": 0, "Results": []})))
      .mount(&server)
      .await;
    let app = app_for(&server);

    assert_eq!(
      app.models("honda", "1901").await.unwrap(),
      "No models found for honda 1901"
    );
  }
}

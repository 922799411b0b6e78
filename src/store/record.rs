use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::nhtsa::VehicleInfo;

/// A decoded VIN as kept in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedVin {
  #[serde(flatten)]
  pub vehicle: VehicleInfo,
  /// Creation time, milliseconds since the Unix epoch
  pub timestamp: i64,
  pub is_favorite: bool,
}

impl DecodedVin {
  /// Wrap a freshly decoded vehicle, stamped with the current time.
  pub fn new(vehicle: VehicleInfo, is_favorite: bool) -> Self {
    Self {
      vehicle,
      timestamp: Utc::now().timestamp_millis(),
      is_favorite,
    }
  }

  pub fn vin(&self) -> &str {
    &self.vehicle.vin
  }

  pub fn display_name(&self) -> String {
    self.vehicle.display_name()
  }

  pub fn created_at(&self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(self.timestamp)
  }

  /// Map a `SELECT *` row from `decoded_vins`.
  pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let vehicle = VehicleInfo {
      vin: row.get("vin")?,
      make: row.get("make")?,
      model: row.get("model")?,
      year: row.get("year")?,
      body_class: row.get("body_class")?,
      vehicle_type: row.get("vehicle_type")?,
      drive_type: row.get("drive_type")?,
      doors: row.get("doors")?,
      trim: row.get("trim")?,
      engine_cylinders: row.get("engine_cylinders")?,
      engine_displacement: row.get("engine_displacement")?,
      engine_hp: row.get("engine_hp")?,
      fuel_type: row.get("fuel_type")?,
      transmission_style: row.get("transmission_style")?,
      manufacturer: row.get("manufacturer")?,
      plant_city: row.get("plant_city")?,
      plant_country: row.get("plant_country")?,
      plant_state: row.get("plant_state")?,
      abs: row.get("abs")?,
      tpms: row.get("tpms")?,
      air_bag_loc_front: row.get("air_bag_loc_front")?,
      air_bag_loc_side: row.get("air_bag_loc_side")?,
      air_bag_loc_curtain: row.get("air_bag_loc_curtain")?,
      series: row.get("series")?,
      gvwr: row.get("gvwr")?,
      error_code: row.get("error_code")?,
      error_text: row.get("error_text")?,
    };

    Ok(Self {
      vehicle,
      timestamp: row.get("timestamp")?,
      is_favorite: row.get("is_favorite")?,
    })
  }
}

use serde::{Deserialize, Serialize};

/// Vehicle attributes decoded from a VIN.
///
/// Every attribute except the VIN is optional: the registry only reports
/// what it knows, and values are kept as the opaque strings it returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleInfo {
  pub vin: String,
  pub make: Option<String>,
  pub model: Option<String>,
  pub year: Option<String>,
  pub body_class: Option<String>,
  pub vehicle_type: Option<String>,
  pub drive_type: Option<String>,
  pub doors: Option<String>,
  pub trim: Option<String>,

  // Engine
  pub engine_cylinders: Option<String>,
  pub engine_displacement: Option<String>,
  pub engine_hp: Option<String>,
  pub fuel_type: Option<String>,
  pub transmission_style: Option<String>,

  // Manufacturing
  pub manufacturer: Option<String>,
  pub plant_city: Option<String>,
  pub plant_country: Option<String>,
  pub plant_state: Option<String>,

  // Safety
  pub abs: Option<String>,
  pub tpms: Option<String>,
  pub air_bag_loc_front: Option<String>,
  pub air_bag_loc_side: Option<String>,
  pub air_bag_loc_curtain: Option<String>,

  pub series: Option<String>,
  pub gvwr: Option<String>,
  pub error_code: Option<String>,
  pub error_text: Option<String>,
}

impl VehicleInfo {
  /// "YEAR MAKE MODEL" from whichever parts are known, or the VIN.
  pub fn display_name(&self) -> String {
    let parts: Vec<&str> = [&self.year, &self.make, &self.model]
      .into_iter()
      .filter_map(|p| p.as_deref())
      .collect();

    let name = parts.join(" ");
    if name.trim().is_empty() {
      self.vin.clone()
    } else {
      name
    }
  }

  /// Whether the registry flagged a problem with this VIN.
  pub fn has_error(&self) -> bool {
    self.error_code.as_deref().is_some_and(|code| code != "0")
  }

  /// Logo image URL for the manufacturer, if the make is known.
  pub fn manufacturer_logo_url(&self) -> Option<String> {
    let make = self.make.as_deref()?.trim();
    if make.is_empty() {
      return None;
    }

    let slug = make.to_lowercase().replace(' ', "-");
    Some(format!("https://www.carlogos.org/car-logos/{}-logo.png", slug))
  }
}

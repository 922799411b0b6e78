//! Plain-text rendering of vehicles, history and model lists.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;

use crate::nhtsa::{ModelResult, VehicleInfo};
use crate::store::DecodedVin;

/// Detail view of a single vehicle, grouped into sections.
///
/// Sections with no known values are left out.
pub fn vehicle_detail(vehicle: &VehicleInfo, is_favorite: bool) -> String {
  let mut out = String::new();

  let star = if is_favorite { " ★" } else { "" };
  out.push_str(&format!("{}{}\n", vehicle.display_name(), star));
  out.push_str(&format!("VIN: {}\n", vehicle.vin));

  let suffixed = |value: &Option<String>, suffix: &str| {
    value.as_ref().map(|v| format!("{}{}", v, suffix))
  };

  let sections: [(&str, Vec<(&str, Option<String>)>); 4] = [
    (
      "Basic Information",
      vec![
        ("Make", vehicle.make.clone()),
        ("Model", vehicle.model.clone()),
        ("Year", vehicle.year.clone()),
        ("Trim", vehicle.trim.clone()),
        ("Series", vehicle.series.clone()),
        ("Body Class", vehicle.body_class.clone()),
        ("Vehicle Type", vehicle.vehicle_type.clone()),
        ("Drive Type", vehicle.drive_type.clone()),
        ("Doors", vehicle.doors.clone()),
      ],
    ),
    (
      "Engine & Performance",
      vec![
        ("Cylinders", vehicle.engine_cylinders.clone()),
        ("Displacement", suffixed(&vehicle.engine_displacement, "L")),
        ("Horsepower", suffixed(&vehicle.engine_hp, " hp")),
        ("Fuel Type", vehicle.fuel_type.clone()),
        ("Transmission", vehicle.transmission_style.clone()),
        ("GVWR", suffixed(&vehicle.gvwr, " lbs")),
      ],
    ),
    (
      "Safety Features",
      vec![
        ("ABS", vehicle.abs.clone()),
        ("TPMS", vehicle.tpms.clone()),
        ("Front Airbags", vehicle.air_bag_loc_front.clone()),
        ("Side Airbags", vehicle.air_bag_loc_side.clone()),
        ("Curtain Airbags", vehicle.air_bag_loc_curtain.clone()),
      ],
    ),
    (
      "Manufacturing",
      vec![
        ("Manufacturer", vehicle.manufacturer.clone()),
        ("Plant City", vehicle.plant_city.clone()),
        ("Plant State", vehicle.plant_state.clone()),
        ("Plant Country", vehicle.plant_country.clone()),
      ],
    ),
  ];

  for (title, items) in sections {
    let known: Vec<(&str, String)> = items
      .into_iter()
      .filter_map(|(label, value)| value.map(|v| (label, v)))
      .collect();
    if known.is_empty() {
      continue;
    }

    out.push_str(&format!("\n{}\n", title));
    for (label, value) in known {
      out.push_str(&format!("  {:<16}{}\n", label, value));
    }
  }

  if vehicle.has_error() || vehicle.error_text.is_some() {
    out.push_str("\nDecode Warnings\n");
    if let Some(code) = &vehicle.error_code {
      out.push_str(&format!("  {:<16}{}\n", "Error Code", code));
    }
    if let Some(text) = &vehicle.error_text {
      out.push_str(&format!("  {:<16}{}\n", "Error Text", text));
    }
  }

  if let Some(url) = vehicle.manufacturer_logo_url() {
    out.push_str(&format!("\nLogo: {}\n", url));
  }

  out
}

/// Table of stored records, in the order given.
pub fn history_table(records: &[DecodedVin], now: DateTime<Utc>) -> String {
  let mut table = Table::new();
  table.load_preset(UTF8_FULL);
  table.set_header(vec!["", "VIN", "Vehicle", "Decoded"]);

  for record in records {
    let star = if record.is_favorite { "★" } else { "" };
    let decoded = relative_time(record.timestamp, now);
    table.add_row(vec![
      star.to_string(),
      record.vin().to_string(),
      record.display_name(),
      decoded,
    ]);
  }

  table.to_string()
}

/// Table of models returned by the registry.
pub fn models_table(models: &[ModelResult]) -> String {
  let mut table = Table::new();
  table.load_preset(UTF8_FULL);
  table.set_header(vec!["Make", "Model", "Model ID"]);

  for model in models {
    table.add_row(vec![
      model.make_name.clone().unwrap_or_default(),
      model.model_name.clone().unwrap_or_else(|| "Unknown".to_string()),
      model.model_id.map(|id| id.to_string()).unwrap_or_default(),
    ]);
  }

  table.to_string()
}

/// Most related models listed under a vehicle.
pub const OTHER_MODELS_LIMIT: usize = 20;

/// Names of the other models in `models`, in registry order.
///
/// `current` and repeated names are skipped; at most `OTHER_MODELS_LIMIT`
/// names are returned.
pub fn other_models<'a>(models: &'a [ModelResult], current: Option<&str>) -> Vec<&'a str> {
  let mut names: Vec<&str> = Vec::new();
  for name in models.iter().filter_map(|m| m.model_name.as_deref()) {
    if Some(name) == current || names.contains(&name) {
      continue;
    }
    names.push(name);
    if names.len() == OTHER_MODELS_LIMIT {
      break;
    }
  }
  names
}

/// "Other Models" block appended to a detail view.
pub fn other_models_section(models: &Result<Vec<ModelResult>>, current: Option<&str>) -> String {
  let body = match models {
    Ok(models) => {
      let names = other_models(models, current);
      if names.is_empty() {
        "No other models found".to_string()
      } else {
        names.join(", ")
      }
    }
    Err(e) => format!("Could not load models: {}", e),
  };

  format!("\nOther Models\n  {}\n", body)
}

/// Pretty-printed JSON for `--json` output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
  serde_json::to_string_pretty(value).map_err(|e| eyre!("Failed to serialize output: {}", e))
}

/// Human-readable age of a millisecond timestamp.
pub fn relative_time(timestamp_ms: i64, now: DateTime<Utc>) -> String {
  const MINUTE: i64 = 60_000;
  const HOUR: i64 = 60 * MINUTE;
  const DAY: i64 = 24 * HOUR;
  const WEEK: i64 = 7 * DAY;

  let diff = now.timestamp_millis() - timestamp_ms;

  match diff {
    d if d < MINUTE => "Just now".to_string(),
    d if d < HOUR => format!("{} min ago", d / MINUTE),
    d if d < DAY => format!("{}h ago", d / HOUR),
    d if d < WEEK => format!("{}d ago", d / DAY),
    _ => DateTime::from_timestamp_millis(timestamp_ms)
      .map(|t| t.format("%b %-d, %Y").to_string())
      .unwrap_or_default(),
  }
}

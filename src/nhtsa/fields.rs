//! Maps the flat variable/value list returned by DecodeVin onto `VehicleInfo`.

use std::collections::HashMap;

use super::api_types::VinResult;
use super::types::VehicleInfo;

/// Error code reported for a clean decode.
const CLEAN_ERROR_CODE: &str = "0";

/// Error text reported for a clean decode.
const CLEAN_ERROR_TEXT: &str = "0 - VIN decoded clean. Check Digit (9th position) is correct";

/// Variable lookup built from a decode response. Later rows win.
struct Variables<'a> {
  values: HashMap<&'a str, &'a str>,
}

impl<'a> Variables<'a> {
  fn new(results: &'a [VinResult]) -> Self {
    // A repeated variable keeps its last value, including a null
    // overriding an earlier non-null one.
    let mut map = HashMap::with_capacity(results.len());
    for r in results {
      if let Some(variable) = r.variable.as_deref() {
        match r.value.as_deref() {
          Some(value) => {
            map.insert(variable, value);
          }
          None => {
            map.remove(variable);
          }
        }
      }
    }

    Self { values: map }
  }

  /// Non-blank value for `variable`, kept verbatim.
  fn get(&self, variable: &str) -> Option<String> {
    self
      .values
      .get(variable)
      .filter(|v| !v.trim().is_empty())
      .map(|v| v.to_string())
  }

  /// Like `get`, but also treating `sentinel` as absent.
  fn get_except(&self, variable: &str, sentinel: &str) -> Option<String> {
    self.get(variable).filter(|v| v != sentinel)
  }
}

impl VehicleInfo {
  /// Build a vehicle record from DecodeVin results.
  pub fn from_results(vin: &str, results: &[VinResult]) -> Self {
    let vars = Variables::new(results);

    Self {
      vin: vin.to_string(),
      make: vars.get("Make"),
      model: vars.get("Model"),
      year: vars.get("Model Year"),
      body_class: vars.get("Body Class"),
      vehicle_type: vars.get("Vehicle Type"),
      drive_type: vars.get("Drive Type"),
      doors: vars.get("Doors"),
      trim: vars.get("Trim"),

      engine_cylinders: vars.get("Engine Number of Cylinders"),
      engine_displacement: vars.get("Displacement (L)"),
      engine_hp: vars.get("Engine Brake (hp) From"),
      fuel_type: vars.get("Fuel Type - Primary"),
      transmission_style: vars.get("Transmission Style"),

      manufacturer: vars.get("Manufacturer Name"),
      plant_city: vars.get("Plant City"),
      plant_country: vars.get("Plant Country"),
      plant_state: vars.get("Plant State"),

      abs: vars.get("Anti-lock Braking System (ABS)"),
      tpms: vars.get("Tire Pressure Monitoring System (TPMS) Type"),
      air_bag_loc_front: vars.get("Air Bag Loc - Front"),
      air_bag_loc_side: vars.get("Air Bag Loc - Side"),
      air_bag_loc_curtain: vars.get("Air Bag Loc - Curtain"),

      series: vars.get("Series"),
      gvwr: vars.get("Gross Vehicle Weight Rating From"),
      error_code: vars.get_except("Error Code", CLEAN_ERROR_CODE),
      error_text: vars.get_except("Error Text", CLEAN_ERROR_TEXT),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const VIN: &str = "1HGBH41JXMN109186";

  #[test]
  fn test_empty_results() {
    let info = VehicleInfo::from_results(VIN, &[]);
    assert_eq!(
      info,
      VehicleInfo {
        vin: VIN.to_string(),
        ..Default::default()
      }
    );
  }

  #[test]
  fn test_maps_known_variables() {
    let results = vec![
      VinResult::new("Make", "HONDA"),
      VinResult::new("Model", "Accord"),
      VinResult::new("Model Year", "2021"),
      VinResult::new("Displacement (L)", "1.5"),
      VinResult::new("Engine Brake (hp) From", "192"),
      VinResult::new("Plant Country", "UNITED STATES (USA)"),
      VinResult::new("Tire Pressure Monitoring System (TPMS) Type", "Direct"),
      VinResult::new("Gross Vehicle Weight Rating From", "Class 1A"),
      VinResult::new("Some Unrelated Variable", "ignored"),
    ];

    let info = VehicleInfo::from_results(VIN, &results);
    assert_eq!(info.make.as_deref(), Some("HONDA"));
    assert_eq!(info.model.as_deref(), Some("Accord"));
    assert_eq!(info.year.as_deref(), Some("2021"));
    assert_eq!(info.engine_displacement.as_deref(), Some("1.5"));
    assert_eq!(info.engine_hp.as_deref(), Some("192"));
    assert_eq!(info.plant_country.as_deref(), Some("UNITED STATES (USA)"));
    assert_eq!(info.tpms.as_deref(), Some("Direct"));
    assert_eq!(info.gvwr.as_deref(), Some("Class 1A"));
    assert_eq!(info.trim, None);
  }

  #[test]
  fn test_blank_and_null_values_are_absent() {
    let results = vec![
      VinResult::new("Make", ""),
      VinResult::new("Model", "   "),
      VinResult {
        variable: Some("Trim".to_string()),
        ..Default::default()
      },
    ];

    let info = VehicleInfo::from_results(VIN, &results);
    assert_eq!(info.make, None);
    assert_eq!(info.model, None);
    assert_eq!(info.trim, None);
  }

  #[test]
  fn test_values_are_not_trimmed() {
    let info = VehicleInfo::from_results(VIN, &[VinResult::new("Series", " EX-L ")]);
    assert_eq!(info.series.as_deref(), Some(" EX-L "));
  }

  #[test]
  fn test_last_occurrence_wins() {
    let results = vec![
      VinResult::new("Make", "ACURA"),
      VinResult::new("Make", "HONDA"),
    ];

    let info = VehicleInfo::from_results(VIN, &results);
    assert_eq!(info.make.as_deref(), Some("HONDA"));
  }

  #[test]
  fn test_rows_without_variable_are_ignored() {
    let results = vec![VinResult {
      value: Some("HONDA".to_string()),
      ..Default::default()
    }];

    let info = VehicleInfo::from_results(VIN, &results);
    assert_eq!(info.make, None);
  }

  #[test]
  fn test_clean_error_code_is_absent() {
    let results = vec![
      VinResult::new("Error Code", "0"),
      VinResult::new("Error Text", CLEAN_ERROR_TEXT),
    ];

    let info = VehicleInfo::from_results(VIN, &results);
    assert_eq!(info.error_code, None);
    assert_eq!(info.error_text, None);
    assert!(!info.has_error());
  }

  #[test]
  fn test_real_error_is_kept() {
    let text = "1 - Check Digit (9th position) does not calculate properly";
    let results = vec![
      VinResult::new("Error Code", "1"),
      VinResult::new("Error Text", text),
    ];

    let info = VehicleInfo::from_results(VIN, &results);
    assert_eq!(info.error_code.as_deref(), Some("1"));
    assert_eq!(info.error_text.as_deref(), Some(text));
    assert!(info.has_error());
  }
}

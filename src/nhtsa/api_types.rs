//! Serde-deserializable types matching vPIC API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::{Deserialize, Serialize};

// ============================================================================
// DecodeVin / DecodeVinExtended
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VinDecodeResponse {
  #[serde(rename = "Count", default)]
  pub count: i64,
  #[serde(rename = "Message", default)]
  pub message: String,
  #[serde(rename = "SearchCriteria")]
  pub search_criteria: Option<String>,
  #[serde(rename = "Results", default)]
  pub results: Vec<VinResult>,
}

/// One decoded variable. Every field may be null in the payload.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct VinResult {
  #[serde(rename = "Value")]
  pub value: Option<String>,
  #[serde(rename = "ValueId")]
  pub value_id: Option<String>,
  #[serde(rename = "Variable")]
  pub variable: Option<String>,
  #[serde(rename = "VariableId")]
  pub variable_id: Option<i64>,
}

#[cfg(test)]
impl VinResult {
  /// Shorthand for a named variable with a value.
  pub fn new(variable: &str, value: &str) -> Self {
    Self {
      value: Some(value.to_string()),
      value_id: None,
      variable: Some(variable.to_string()),
      variable_id: None,
    }
  }
}

// ============================================================================
// GetModelsForMakeYear
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MakeModelsResponse {
  #[serde(rename = "Count", default)]
  pub count: i64,
  #[serde(rename = "Message", default)]
  pub message: String,
  #[serde(rename = "SearchCriteria")]
  pub search_criteria: Option<String>,
  #[serde(rename = "Results", default)]
  pub results: Vec<ModelResult>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ModelResult {
  #[serde(rename = "Make_ID")]
  pub make_id: Option<i64>,
  #[serde(rename = "Make_Name")]
  pub make_name: Option<String>,
  #[serde(rename = "Model_ID")]
  pub model_id: Option<i64>,
  #[serde(rename = "Model_Name")]
  pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_response_with_nulls() {
    let json = r#"{
      "Count": 3,
      "Message": "Results returned successfully",
      "SearchCriteria": "VIN:1HGBH41JXMN109186",
      "Results": [
        {"Value": "HONDA", "ValueId": "474", "Variable": "Make", "VariableId": 26},
        {"Value": null, "ValueId": null, "Variable": "Trim", "VariableId": 38},
        {"Value": "0", "ValueId": "0", "Variable": "Error Code", "VariableId": 143}
      ]
    }"#;

    let response: VinDecodeResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.count, 3);
    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results[0].variable.as_deref(), Some("Make"));
    assert_eq!(response.results[0].value.as_deref(), Some("HONDA"));
    assert_eq!(response.results[0].variable_id, Some(26));
    assert_eq!(response.results[1].value, None);
  }

  #[test]
  fn test_decode_response_missing_envelope_fields() {
    let response: VinDecodeResponse = serde_json::from_str(r#"{"Results": []}"#).unwrap();
    assert_eq!(response.count, 0);
    assert!(response.message.is_empty());
    assert!(response.search_criteria.is_none());
  }

  #[test]
  fn test_models_response() {
    let json = r#"{
      "Count": 2,
      "Message": "Response returned successfully",
      "SearchCriteria": "Make:honda | ModelYear:2021",
      "Results": [
        {"Make_ID": 474, "Make_Name": "HONDA", "Model_ID": 1861, "Model_Name": "Accord"},
        {"Make_ID": 474, "Make_Name": "HONDA", "Model_ID": 1863, "Model_Name": "Civic"}
      ]
    }"#;

    let response: MakeModelsResponse = serde_json::from_str(json).unwrap();
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[1].model_name.as_deref(), Some("Civic"));
    assert_eq!(response.results[1].model_id, Some(1863));
  }
}

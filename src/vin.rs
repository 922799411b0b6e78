//! VIN input validation and normalization.

/// Length of every modern VIN.
pub const VIN_LENGTH: usize = 17;

/// Letters never used in a VIN (easily confused with 1, 0 and 9).
const DISALLOWED: [char; 3] = ['I', 'O', 'Q'];

fn is_vin_char(c: char) -> bool {
  c.is_ascii_alphanumeric() && !DISALLOWED.contains(&c)
}

/// Check that a string is a well-formed VIN: 17 alphanumeric characters
/// without I, O or Q.
pub fn is_valid_vin(vin: &str) -> bool {
  vin.chars().count() == VIN_LENGTH && vin.chars().all(is_vin_char)
}

/// Clean up free-form user input into something that can become a VIN.
///
/// Uppercases, strips characters that can never appear in a VIN and
/// truncates to 17 characters. The result is not guaranteed to be valid.
pub fn normalize_vin_input(input: &str) -> String {
  input
    .to_uppercase()
    .chars()
    .filter(|c| is_vin_char(*c))
    .take(VIN_LENGTH)
    .collect()
}

/// Canonical storage key for a VIN.
pub fn normalize_vin(vin: &str) -> String {
  vin.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_valid_vin() {
    assert!(is_valid_vin("1HGBH41JXMN109186"));
  }

  #[test]
  fn test_too_short() {
    assert!(!is_valid_vin("1HGBH41JXMN10918"));
  }

  #[test]
  fn test_too_long() {
    assert!(!is_valid_vin("1HGBH41JXMN1091860"));
  }

  #[test]
  fn test_disallowed_letters() {
    assert!(!is_valid_vin("1HGBH41IXMN109186"));
    assert!(!is_valid_vin("1HGBH41OXMN109186"));
    assert!(!is_valid_vin("1HGBH41QXMN109186"));
  }

  #[test]
  fn test_non_alphanumeric() {
    assert!(!is_valid_vin("1HGBH41-XMN109186"));
    assert!(!is_valid_vin("1HGBH41 XMN109186"));
  }

  #[test]
  fn test_normalize_input_uppercases_and_strips() {
    assert_eq!(normalize_vin_input("1hgbh41jxmn109186"), "1HGBH41JXMN109186");
    assert_eq!(normalize_vin_input("1HG-BH4 1JX"), "1HGBH41JX");
    assert_eq!(normalize_vin_input("ioq123"), "123");
  }

  #[test]
  fn test_normalize_input_truncates() {
    let vin = normalize_vin_input("1HGBH41JXMN109186EXTRA");
    assert_eq!(vin, "1HGBH41JXMN109186");
    assert!(is_valid_vin(&vin));
  }

  #[test]
  fn test_normalize_vin_key() {
    assert_eq!(normalize_vin("  1hgbh41jxmn109186 "), "1HGBH41JXMN109186");
  }
}

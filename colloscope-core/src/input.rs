use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static GROUP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new("^G(\\d+)$").unwrap());

/// Inclusive range of group numbers of a deployment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GroupRange {
  pub min: u32,
  pub max: u32,
}

impl Default for GroupRange {
  fn default() -> Self {
    Self { min: 1, max: 20 }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
  #[error("le groupe « {0} » doit s'écrire G suivi d'un numéro, par exemple G1")]
  InvalidGroup(String),
  #[error("le groupe G{number} n'existe pas, les groupes vont de G{min} à G{max}")]
  GroupOutOfRange { number: u32, min: u32, max: u32 },
  #[error("la semaine « {0} » n'est pas un nombre")]
  WeekNotANumber(String),
  #[error("la semaine {week} n'existe pas, les semaines vont de 1 à {cap}")]
  WeekOutOfRange { week: i64, cap: u32 },
}

/// Whether `key` has the shape of a group, `G` followed by digits.
pub fn is_group_key(key: &str) -> bool {
  GROUP_REGEX.is_match(key.trim())
}

/// Checks a group typed by the user, e.g. ` G7 `, and returns it trimmed.
pub fn validate_group(raw: &str, range: GroupRange) -> Result<String, InputError> {
  let group = raw.trim();

  let captures = GROUP_REGEX
    .captures(group)
    .ok_or_else(|| InputError::InvalidGroup(group.to_string()))?;

  let number = match u32::from_str(&captures[1]) {
    Ok(number) => number,
    Err(_) => return Err(InputError::InvalidGroup(group.to_string())),
  };

  if number < range.min || number > range.max {
    return Err(InputError::GroupOutOfRange {
      number,
      min: range.min,
      max: range.max,
    });
  }

  Ok(group.to_string())
}

/// Parses a week typed by the user, valid in `[1, cap]`.
pub fn validate_week(raw: &str, cap: u32) -> Result<u32, InputError> {
  let raw = raw.trim();

  let week = i64::from_str(raw).map_err(|_| InputError::WeekNotANumber(raw.to_string()))?;

  if week < 1 || week > i64::from(cap) {
    return Err(InputError::WeekOutOfRange { week, cap });
  }

  Ok(week as u32)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn groups() {
    let range = GroupRange::default();

    assert_eq!(validate_group("G1", range), Ok("G1".to_string()));
    assert_eq!(validate_group(" G20 ", range), Ok("G20".to_string()));
    assert_eq!(
      validate_group("G21", range),
      Err(InputError::GroupOutOfRange {
        number: 21,
        min: 1,
        max: 20
      })
    );
    assert!(matches!(
      validate_group("G0", range),
      Err(InputError::GroupOutOfRange { number: 0, .. })
    ));
    assert_eq!(
      validate_group("g1", range),
      Err(InputError::InvalidGroup("g1".to_string()))
    );
    assert!(matches!(
      validate_group("G", range),
      Err(InputError::InvalidGroup(_))
    ));
    assert!(matches!(
      validate_group("G1a", range),
      Err(InputError::InvalidGroup(_))
    ));
    assert!(matches!(
      validate_group("G99999999999", range),
      Err(InputError::InvalidGroup(_))
    ));
  }

  #[test]
  fn group_keys() {
    assert!(is_group_key("G12"));
    assert!(is_group_key(" G1 "));
    assert!(!is_group_key("Groupe"));
    assert!(!is_group_key(""));
  }

  #[test]
  fn group_range_is_configurable() {
    let range = GroupRange { min: 1, max: 100 };
    assert_eq!(validate_group("G99", range), Ok("G99".to_string()));
  }

  #[test]
  fn weeks() {
    assert_eq!(validate_week("12", 30), Ok(12));
    assert_eq!(validate_week(" 1 ", 30), Ok(1));
    assert_eq!(validate_week("36", 36), Ok(36));
    assert_eq!(
      validate_week("31", 30),
      Err(InputError::WeekOutOfRange { week: 31, cap: 30 })
    );
    assert_eq!(
      validate_week("0", 30),
      Err(InputError::WeekOutOfRange { week: 0, cap: 30 })
    );
    assert_eq!(
      validate_week("-3", 30),
      Err(InputError::WeekOutOfRange { week: -3, cap: 30 })
    );
    assert_eq!(
      validate_week("douze", 30),
      Err(InputError::WeekNotANumber("douze".to_string()))
    );
    assert_eq!(
      validate_week("", 30),
      Err(InputError::WeekNotANumber(String::new()))
    );
  }
}

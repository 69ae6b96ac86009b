use serde::{Serialize, Deserialize};
use std::fmt;

const HIGH_SENSITIVITY_SECTORS: [&str; 3] = ["Real Estate", "Utilities", "Telecommunications Services"];
const MODERATE_SENSITIVITY_SECTORS: [&str; 2] = ["Energy", "Financials"];

/// Debt-to-equity above this escalates the sector's base sensitivity by one level.
pub const DEBT_TO_EQUITY_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensitivityLabel {
  Low,
  Moderate,
  High,
  #[serde(rename = "Very High")]
  VeryHigh,
}

impl SensitivityLabel {
  pub fn as_str(&self) -> &'static str {
    match self {
      SensitivityLabel::Low => "Low",
      SensitivityLabel::Moderate => "Moderate",
      SensitivityLabel::High => "High",
      SensitivityLabel::VeryHigh => "Very High",
    }
  }
}

impl fmt::Display for SensitivityLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

fn base_sensitivity(sector: Option<&str>) -> SensitivityLabel {
  match sector {
    Some(s) if HIGH_SENSITIVITY_SECTORS.contains(&s) => SensitivityLabel::High,
    Some(s) if MODERATE_SENSITIVITY_SECTORS.contains(&s) => SensitivityLabel::Moderate,
    _ => SensitivityLabel::Low,
  }
}

/// Interest-rate sensitivity from sector membership and leverage.
pub fn classify(sector: Option<&str>, debt_to_equity: Option<f64>) -> SensitivityLabel {
  let base: SensitivityLabel = base_sensitivity(sector);

  match debt_to_equity {
    Some(de) if de > DEBT_TO_EQUITY_THRESHOLD => match base {
      SensitivityLabel::High => SensitivityLabel::VeryHigh,
      _ => SensitivityLabel::High,
    },
    _ => base,
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_table() {
    assert_eq!(classify(Some("Real Estate"), Some(1.5)), SensitivityLabel::VeryHigh);
    assert_eq!(classify(Some("Real Estate"), Some(0.5)), SensitivityLabel::High);
    assert_eq!(classify(Some("Energy"), Some(1.5)), SensitivityLabel::High);
    assert_eq!(classify(Some("Energy"), Some(0.5)), SensitivityLabel::Moderate);
    assert_eq!(classify(Some("Technology"), Some(0.5)), SensitivityLabel::Low);
    assert_eq!(classify(Some("Technology"), None), SensitivityLabel::Low);
  }

  #[test]
  fn threshold_is_exclusive() {
    assert_eq!(classify(Some("Utilities"), Some(1.0)), SensitivityLabel::High);
    assert_eq!(classify(Some("Technology"), Some(1.0)), SensitivityLabel::Low);
    assert_eq!(classify(None, Some(2.0)), SensitivityLabel::High);
  }

  #[test]
  fn very_high_displays_with_a_space() {
    assert_eq!(SensitivityLabel::VeryHigh.to_string(), "Very High");
    assert_eq!(serde_json::to_value(SensitivityLabel::VeryHigh).unwrap(), "Very High");
  }
}

use crate::research::analysis::sensitivity::{classify, SensitivityLabel};
use crate::research::data::models::CompanyProfile;

pub const INSUFFICIENT_DATA: &str = "Error: Unable to retrieve all necessary financial data for this stock.";

const FAIR_VALUE_PE: f64 = 20.0;
const STRONG_ROE: f64 = 0.15;

/// Long-term investment checklist over P/E, ROE, leverage and rate sensitivity.
/// Needs all four inputs; otherwise a single error line is returned.
pub fn evaluate_stock(profile: &CompanyProfile) -> Vec<String> {
  let (debt_to_equity, roe, sector, pe_ratio) = match (profile.debt_to_equity, profile.return_on_equity, profile.sector.as_deref(), profile.pe_ratio) {
    (Some(de), Some(roe), Some(sector), Some(pe)) => (de, roe, sector, pe),
    _ => return vec![INSUFFICIENT_DATA.to_string()],
  };

  let mut lines: Vec<String> = Vec::new();

  if pe_ratio < FAIR_VALUE_PE {
    lines.push(format!("Positive: The P/E ratio of {:.2} suggests the stock is fairly valued or undervalued.", pe_ratio));
  }
  else {
    lines.push(format!("Consideration: The P/E ratio of {:.2} suggests the stock might be overvalued.", pe_ratio));
  }

  if roe > STRONG_ROE {
    lines.push("Positive: The company has a strong Return on Equity.".to_string());
  }
  else {
    lines.push(format!("Consideration: The Return on Equity of {:.2} is relatively low.", roe));
  }

  let sensitivity: SensitivityLabel = classify(Some(sector), Some(debt_to_equity));
  lines.push(format!("Interest Rate Sensitivity: {}", sensitivity));
  lines.push(format!("Debt-to-Equity Ratio: {:.2}", debt_to_equity));
  lines.push(String::new());
  lines.push("Overall evaluation based on the financial metrics provided.".to_string());

  lines
}


#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn profile(pe: Option<f64>, roe: Option<f64>, de: Option<f64>, sector: &str) -> CompanyProfile {
    CompanyProfile {
      ticker: "ACME".to_string(),
      sector: Some(sector.to_string()),
      pe_ratio: pe,
      return_on_equity: roe,
      debt_to_equity: de,
      ..CompanyProfile::default()
    }
  }

  #[test]
  fn undervalued_profitable_utility() {
    let lines = evaluate_stock(&profile(Some(15.0), Some(0.2), Some(1.4), "Utilities"));
    assert_eq!(lines, vec![
      "Positive: The P/E ratio of 15.00 suggests the stock is fairly valued or undervalued.".to_string(),
      "Positive: The company has a strong Return on Equity.".to_string(),
      "Interest Rate Sensitivity: Very High".to_string(),
      "Debt-to-Equity Ratio: 1.40".to_string(),
      String::new(),
      "Overall evaluation based on the financial metrics provided.".to_string(),
    ]);
  }

  #[test]
  fn expensive_low_return_stock() {
    let lines = evaluate_stock(&profile(Some(35.0), Some(0.05), Some(0.3), "Technology"));
    assert_eq!(lines[0], "Consideration: The P/E ratio of 35.00 suggests the stock might be overvalued.");
    assert_eq!(lines[1], "Consideration: The Return on Equity of 0.05 is relatively low.");
    assert_eq!(lines[2], "Interest Rate Sensitivity: Low");
  }

  #[test]
  fn missing_input_is_reported() {
    assert_eq!(evaluate_stock(&profile(Some(15.0), None, Some(0.3), "Energy")), vec![INSUFFICIENT_DATA.to_string()]);
  }
}

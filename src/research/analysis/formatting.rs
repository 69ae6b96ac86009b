use crate::research::analysis::ratios::MetricFormat;

pub const NOT_AVAILABLE: &str = "N/A";

fn group_thousands(value: f64) -> String {
  let fixed: String = format!("{:.2}", value.abs());
  let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

  let mut grouped: String = String::with_capacity(whole.len() + whole.len() / 3);
  for (i, digit) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(digit);
  }

  let sign: &str = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
  format!("{}{}.{}", sign, grouped, fraction)
}

/// `1234.5` → `1,234.50`
pub fn format_number(value: Option<f64>) -> String {
  match value {
    Some(v) if v.is_finite() => group_thousands(v),
    _ => NOT_AVAILABLE.to_string(),
  }
}

/// `1234.5` → `$1,234.50`, negatives as `-$1,234.50`
pub fn format_currency(value: Option<f64>) -> String {
  match value {
    Some(v) if v.is_finite() => {
      let grouped: String = group_thousands(v);
      match grouped.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", grouped),
      }
    },
    _ => NOT_AVAILABLE.to_string(),
  }
}

pub fn format_percent(value: Option<f64>) -> String {
  match value {
    Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
    _ => NOT_AVAILABLE.to_string(),
  }
}

pub fn format_multiple(value: Option<f64>) -> String {
  match value {
    Some(v) if v.is_finite() => format!("{:.2}x", v),
    _ => NOT_AVAILABLE.to_string(),
  }
}

pub fn format_metric(value: Option<f64>, format: MetricFormat) -> String {
  match format {
    MetricFormat::Percent => format_percent(value),
    MetricFormat::Currency => format_currency(value),
    MetricFormat::Multiple => format_multiple(value),
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numbers_get_thousands_separators() {
    assert_eq!(format_number(Some(0.0)), "0.00");
    assert_eq!(format_number(Some(999.999)), "1,000.00");
    assert_eq!(format_number(Some(1234567.891)), "1,234,567.89");
    assert_eq!(format_number(Some(-1234.5)), "-1,234.50");
    assert_eq!(format_number(None), "N/A");
    assert_eq!(format_number(Some(f64::NAN)), "N/A");
  }

  #[test]
  fn currency_puts_sign_before_symbol() {
    assert_eq!(format_currency(Some(2.5e12)), "$2,500,000,000,000.00");
    assert_eq!(format_currency(Some(-250.0)), "-$250.00");
    assert_eq!(format_currency(None), "N/A");
  }

  #[test]
  fn ratios_format_by_kind() {
    assert_eq!(format_metric(Some(0.1234), MetricFormat::Percent), "12.34%");
    assert_eq!(format_metric(Some(2.0), MetricFormat::Multiple), "2.00x");
    assert_eq!(format_metric(None, MetricFormat::Multiple), "N/A");
  }
}

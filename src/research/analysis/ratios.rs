//! Financial ratios over the three statements.
//!
//! Every function takes only the line items it needs and returns `None` when
//! an input is missing, a denominator is zero, or the result is not finite.
//! Failures are per metric: one unavailable ratio never blocks another.

use serde::{Serialize, Deserialize};

use crate::research::data::models::FinancialStatements;

// Line item names as the market-data provider reports them.
pub const REVENUE: &str = "revenue";
pub const NET_INCOME: &str = "net_income";
pub const RESEARCH_AND_DEVELOPMENT: &str = "research_and_development";
pub const EBIT: &str = "ebit";
pub const OPERATING_INCOME: &str = "operating_income";
pub const INTEREST_EXPENSE: &str = "interest_expense";
pub const TOTAL_ASSETS: &str = "total_assets";
pub const SHAREHOLDERS_EQUITY: &str = "shareholders_equity";
pub const TOTAL_EQUITY: &str = "total_equity";
pub const TOTAL_DEBT: &str = "total_debt";
pub const CASH_AND_EQUIVALENTS: &str = "cash_and_equivalents";
pub const OPERATING_CASH_FLOW: &str = "net_cash_flow_from_operations";
pub const CAPITAL_EXPENDITURE: &str = "capital_expenditure";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricFormat {
  Percent,
  Currency,
  Multiple,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioSet {
  pub revenue_growth: Option<f64>,
  pub cagr: Option<f64>,
  pub net_profit_margin: Option<f64>,
  pub free_cash_flow: Option<f64>,
  pub return_on_assets: Option<f64>,
  pub rd_spend_pct: Option<f64>,
  pub asset_turnover: Option<f64>,
  pub financial_leverage: Option<f64>,
  pub debt_to_assets: Option<f64>,
  pub interest_coverage: Option<f64>,
  pub leverage_ratio: Option<f64>,
  pub net_debt: Option<f64>,
  pub debt_service_coverage: Option<f64>,
  pub free_cash_flow_to_debt: Option<f64>,
}

fn finite(value: f64) -> Option<f64> {
  Some(value).filter(|v| v.is_finite())
}

pub fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
  match (numerator, denominator) {
    (Some(n), Some(d)) if d != 0.0 => finite(n / d),
    _ => None,
  }
}

pub fn revenue_growth(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
  match (current, previous) {
    (Some(c), Some(p)) => safe_div(Some(c - p), Some(p)),
    _ => None,
  }
}

/// Compound growth with `periods` as the exponent base. With one period this is plain growth.
pub fn cagr(first: Option<f64>, last: Option<f64>, periods: usize) -> Option<f64> {
  match (first, last) {
    (Some(f), Some(l)) if f > 0.0 && l >= 0.0 && periods > 0 => finite((l / f).powf(1.0 / periods as f64) - 1.0),
    _ => None,
  }
}

pub fn net_profit_margin(net_income: Option<f64>, revenue: Option<f64>) -> Option<f64> {
  safe_div(net_income, revenue)
}

/// Providers disagree on the sign of capital expenditure, so its magnitude is used.
pub fn free_cash_flow(operating_cash_flow: Option<f64>, capital_expenditure: Option<f64>) -> Option<f64> {
  match (operating_cash_flow, capital_expenditure) {
    (Some(ocf), Some(capex)) => finite(ocf - capex.abs()),
    _ => None,
  }
}

pub fn return_on_assets(net_income: Option<f64>, total_assets: Option<f64>) -> Option<f64> {
  safe_div(net_income, total_assets)
}

pub fn rd_spend_pct(rd_expense: Option<f64>, revenue: Option<f64>) -> Option<f64> {
  safe_div(rd_expense, revenue)
}

pub fn asset_turnover(revenue: Option<f64>, total_assets: Option<f64>) -> Option<f64> {
  safe_div(revenue, total_assets)
}

pub fn financial_leverage(total_assets: Option<f64>, shareholders_equity: Option<f64>) -> Option<f64> {
  safe_div(total_assets, shareholders_equity)
}

pub fn debt_to_assets(total_debt: Option<f64>, total_assets: Option<f64>) -> Option<f64> {
  safe_div(total_debt, total_assets)
}

pub fn interest_coverage(ebit: Option<f64>, interest_expense: Option<f64>) -> Option<f64> {
  safe_div(ebit, interest_expense)
}

/// Same formula as [`financial_leverage`]; kept under its own name because
/// reports have always shown both.
pub fn leverage_ratio(total_assets: Option<f64>, total_equity: Option<f64>) -> Option<f64> {
  financial_leverage(total_assets, total_equity)
}

pub fn net_debt(total_debt: Option<f64>, cash_and_equivalents: Option<f64>) -> Option<f64> {
  match (total_debt, cash_and_equivalents) {
    (Some(debt), Some(cash)) => finite(debt - cash),
    _ => None,
  }
}

pub fn debt_service_coverage(operating_cash_flow: Option<f64>, interest_expense: Option<f64>) -> Option<f64> {
  safe_div(operating_cash_flow, interest_expense)
}

pub fn free_cash_flow_to_debt(free_cash_flow: Option<f64>, total_debt: Option<f64>) -> Option<f64> {
  safe_div(free_cash_flow, total_debt)
}

impl RatioSet {
  pub fn compute(statements: &FinancialStatements) -> Self {
    let income = &statements.income;
    let balance = &statements.balance;
    let cash_flow = &statements.cash_flow;

    let revenue: Option<f64> = income.latest(REVENUE);
    let net_income: Option<f64> = income.latest(NET_INCOME);
    let ebit: Option<f64> = income.latest(EBIT).or_else(|| income.latest(OPERATING_INCOME));
    let interest_expense: Option<f64> = income.latest(INTEREST_EXPENSE);

    let total_assets: Option<f64> = balance.latest(TOTAL_ASSETS);
    let shareholders_equity: Option<f64> = balance.latest(SHAREHOLDERS_EQUITY);
    let total_equity: Option<f64> = balance.latest(TOTAL_EQUITY).or(shareholders_equity);
    let total_debt: Option<f64> = balance.latest(TOTAL_DEBT);

    let operating_cash_flow: Option<f64> = cash_flow.latest(OPERATING_CASH_FLOW);
    let fcf: Option<f64> = free_cash_flow(operating_cash_flow, cash_flow.latest(CAPITAL_EXPENDITURE));

    RatioSet {
      revenue_growth: revenue_growth(revenue, income.previous(REVENUE)),
      cagr: cagr(income.earliest(REVENUE), revenue, income.len()),
      net_profit_margin: net_profit_margin(net_income, revenue),
      free_cash_flow: fcf,
      return_on_assets: return_on_assets(net_income, total_assets),
      rd_spend_pct: rd_spend_pct(income.latest(RESEARCH_AND_DEVELOPMENT), revenue),
      asset_turnover: asset_turnover(revenue, total_assets),
      financial_leverage: financial_leverage(total_assets, shareholders_equity),
      debt_to_assets: debt_to_assets(total_debt, total_assets),
      interest_coverage: interest_coverage(ebit, interest_expense),
      leverage_ratio: leverage_ratio(total_assets, total_equity),
      net_debt: net_debt(total_debt, balance.latest(CASH_AND_EQUIVALENTS)),
      debt_service_coverage: debt_service_coverage(operating_cash_flow, interest_expense),
      free_cash_flow_to_debt: free_cash_flow_to_debt(fcf, total_debt),
    }
  }

  /// Labelled values in display order.
  pub fn entries(&self) -> Vec<(&'static str, Option<f64>, MetricFormat)> {
    vec![
      ("Revenue Growth (YoY)", self.revenue_growth, MetricFormat::Percent),
      ("Revenue CAGR", self.cagr, MetricFormat::Percent),
      ("Net Profit Margin", self.net_profit_margin, MetricFormat::Percent),
      ("Free Cash Flow", self.free_cash_flow, MetricFormat::Currency),
      ("Return on Assets", self.return_on_assets, MetricFormat::Percent),
      ("R&D Spend (% of Revenue)", self.rd_spend_pct, MetricFormat::Percent),
      ("Asset Turnover", self.asset_turnover, MetricFormat::Multiple),
      ("Financial Leverage", self.financial_leverage, MetricFormat::Multiple),
      ("Debt to Assets", self.debt_to_assets, MetricFormat::Percent),
      ("Interest Coverage", self.interest_coverage, MetricFormat::Multiple),
      ("Leverage Ratio", self.leverage_ratio, MetricFormat::Multiple),
      ("Net Debt", self.net_debt, MetricFormat::Currency),
      ("Debt Service Coverage", self.debt_service_coverage, MetricFormat::Multiple),
      ("Free Cash Flow to Debt", self.free_cash_flow_to_debt, MetricFormat::Multiple),
    ]
  }

  pub fn available_count(&self) -> usize {
    self.entries().iter().filter(|(_, value, _)| value.is_some()).count()
  }
}

use anyhow::{Context, Result};
use handlebars::{handlebars_helper, html_escape, Handlebars};
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::services::report_service::{CompanyReport, ReportRequest};
use crate::research::analysis::formatting::{format_currency, format_metric, format_number, format_percent};

const INDEX: &str = "index";
const REPORT: &str = "report";

handlebars_helper!(currency: |value: Json| format_currency(value.as_f64()));
handlebars_helper!(number: |value: Json| format_number(value.as_f64()));
handlebars_helper!(percent: |value: Json| format_percent(value.as_f64()));
// Escapes first, so the output is safe for triple-stash.
handlebars_helper!(nl2br: |value: Json| value.as_str().map(|text| html_escape(text).replace('\n', "<br>\n")).unwrap_or_default());

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Company Research</title>
</head>
<body>
  <h1>Company Research</h1>
  {{#if error}}<p class="error">{{error}}</p>{{/if}}
  <form method="post" action="/">
    <label for="ticker">Ticker</label>
    <input type="text" id="ticker" name="ticker" value="{{request.ticker}}" placeholder="AAPL">
    <label for="company_name">Company name</label>
    <input type="text" id="company_name" name="company_name" value="{{request.company_name}}" placeholder="Apple Inc.">
    <label for="company_number">Companies House number (optional)</label>
    <input type="text" id="company_number" name="company_number" value="{{request.company_number}}">
    <button type="submit">Generate report</button>
  </form>

  <h2>Quick Evaluation</h2>
  <form id="stock-form">
    <label for="company-name">Company name or ticker</label>
    <input type="text" id="company-name" name="company_name">
    <button type="submit">Evaluate</button>
  </form>
  <pre id="results"></pre>
  <script>
    const stockForm = document.getElementById('stock-form');
    const results = document.getElementById('results');
    stockForm.addEventListener('submit', (event) => {
      event.preventDefault();
      const companyName = document.getElementById('company-name').value;
      fetch('/evaluate', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ company_name: companyName })
      })
        .then((response) => response.json())
        .then((data) => { results.textContent = data.evaluation; })
        .catch(() => { results.textContent = 'An error occurred while evaluating the stock.'; });
    });
  </script>
</body>
</html>
"#;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{{title}} | Company Research</title>
</head>
<body>
  <h1>{{title}}</h1>
  <p>{{report.profile.sector}}{{#if report.profile.industry}} / {{report.profile.industry}}{{/if}}</p>
  {{#if report.profile.summary}}<p class="description">{{report.profile.summary}}</p>{{/if}}

  <h2>Summary</h2>
  <p class="summary">{{{nl2br report.summary}}}</p>
  {{#if report.ai_generated}}<p class="note">Generated by a language model.</p>{{/if}}

  <h2>Key Metrics</h2>
  <table>
    <tr><th></th><th>{{report.ticker}}</th><th>Sector average</th></tr>
    <tr><td>Market Cap</td><td>{{currency report.profile.market_cap}}</td><td>{{currency report.sector_averages.market_cap}}</td></tr>
    <tr><td>P/E Ratio</td><td>{{number report.profile.pe_ratio}}</td><td>{{number report.sector_averages.pe_ratio}}</td></tr>
    <tr><td>EPS</td><td>{{number report.profile.eps}}</td><td>{{number report.sector_averages.eps}}</td></tr>
    <tr><td>Beta</td><td>{{number report.profile.beta}}</td><td>{{number report.sector_averages.beta}}</td></tr>
    <tr><td>Dividend Yield</td><td>{{percent report.profile.dividend_yield}}</td><td>{{percent report.sector_averages.dividend_yield}}</td></tr>
    <tr><td>Debt to Equity</td><td>{{number report.profile.debt_to_equity}}</td><td></td></tr>
    <tr><td>Return on Equity</td><td>{{percent report.profile.return_on_equity}}</td><td></td></tr>
  </table>
  {{#if report.sector_averages.peer_count}}<p class="note">Sector averages over {{report.sector_averages.peer_count}} peers.</p>{{/if}}

  <h2>Financial Ratios</h2>
  <table>
    {{#each metrics}}<tr><td>{{label}}</td><td>{{value}}</td></tr>
    {{/each}}
  </table>

  <h2>Interest Rate Sensitivity</h2>
  <p>{{sensitivity}}</p>

  {{#if report.price_summary}}
  <h2>Price History</h2>
  <p>{{report.price_summary.start_date}} to {{report.price_summary.end_date}}: close {{currency report.price_summary.latest_close}},
     high {{currency report.price_summary.period_high}}, low {{currency report.price_summary.period_low}},
     return {{percent report.price_summary.period_return}}</p>
  {{/if}}

  {{#if report.legal_summary}}
  <h2>Legal</h2>
  <p>{{{nl2br report.legal_summary}}}</p>
  {{/if}}

  <p class="note">Generated {{report.generated_at}}</p>
  <p><a href="/">New search</a></p>
</body>
</html>
"#;

#[derive(Debug, Serialize)]
struct MetricRow {
  label: &'static str,
  value: String,
}

pub struct ReportViews {
  registry: Handlebars<'static>,
}

impl ReportViews {

  pub fn new() -> Result<Self> {
    let mut registry: Handlebars<'static> = Handlebars::new();
    registry.register_helper("currency", Box::new(currency));
    registry.register_helper("number", Box::new(number));
    registry.register_helper("percent", Box::new(percent));
    registry.register_helper("nl2br", Box::new(nl2br));

    registry.register_template_string(INDEX, INDEX_TEMPLATE).context("Invalid index template")?;
    registry.register_template_string(REPORT, REPORT_TEMPLATE).context("Invalid report template")?;

    Ok(ReportViews { registry })
  }

  /// The input form, optionally with an error message and the previous input.
  pub fn render_index(&self, error: Option<&str>, request: Option<&ReportRequest>) -> Result<String> {
    let context: Value = json!({ "error": error, "request": request });
    self.registry.render(INDEX, &context).context("Failed to render index page")
  }

  pub fn render_report(&self, report: &CompanyReport) -> Result<String> {
    let metrics: Vec<MetricRow> = report.ratios.entries().into_iter()
      .map(|(label, value, format)| MetricRow { label, value: format_metric(value, format) })
      .collect();

    let title: String = match &report.profile.name {
      Some(name) => format!("{} ({})", name, report.ticker),
      None => report.ticker.clone(),
    };

    let context: Value = json!({
      "title": title,
      "report": report,
      "metrics": metrics,
      "sensitivity": report.sensitivity.as_str(),
    });
    self.registry.render(REPORT, &context).with_context(|| format!("Failed to render report for {}", report.ticker))
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::research::analysis::peers::SectorAverages;
  use crate::research::analysis::ratios::RatioSet;
  use crate::research::analysis::sensitivity::SensitivityLabel;
  use crate::research::data::models::CompanyProfile;

  fn report() -> CompanyReport {
    CompanyReport {
      ticker: "ACME".to_string(),
      profile: CompanyProfile {
        ticker: "ACME".to_string(),
        name: Some("Acme & Sons".to_string()),
        sector: Some("Utilities".to_string()),
        market_cap: Some(1234567.0),
        return_on_equity: Some(0.125),
        ..CompanyProfile::default()
      },
      ratios: RatioSet { net_profit_margin: Some(0.1), free_cash_flow: Some(-2500.0), ..RatioSet::default() },
      sensitivity: SensitivityLabel::VeryHigh,
      legal_summary: Some("Companies House Legal Filings:\nLiquidation <notice>".to_string()),
      sector_averages: SectorAverages::default(),
      price_summary: None,
      summary: "Line one\nLine two".to_string(),
      ai_generated: false,
      generated_at: "2024-01-01 09:00".to_string(),
    }
  }

  #[test]
  fn index_shows_error_and_previous_input() {
    let views = ReportViews::new().unwrap();
    let request = ReportRequest { ticker: "<b>".to_string(), ..ReportRequest::default() };

    let html = views.render_index(Some("Please provide a company ticker or company name."), Some(&request)).unwrap();

    assert!(html.contains("<p class=\"error\">Please provide a company ticker or company name.</p>"));
    assert!(html.contains("value=\"&lt;b&gt;\""));
  }

  #[test]
  fn plain_index_has_no_error() {
    let html = ReportViews::new().unwrap().render_index(None, None).unwrap();
    assert!(!html.contains("class=\"error\""));
    assert!(html.contains("name=\"company_number\""));
  }

  #[test]
  fn index_offers_the_evaluation_form() {
    let html = ReportViews::new().unwrap().render_index(None, None).unwrap();
    assert!(html.contains("<form id=\"stock-form\">"));
    assert!(html.contains("fetch('/evaluate'"));
    assert!(html.contains("body: JSON.stringify({ company_name: companyName })"));
  }

  #[test]
  fn report_formats_metrics() {
    let html = ReportViews::new().unwrap().render_report(&report()).unwrap();

    assert!(html.contains("Acme &amp; Sons (ACME)"));
    assert!(html.contains("<td>$1,234,567.00</td>"));
    assert!(html.contains("<td>12.50%</td>"));
    assert!(html.contains("<tr><td>Net Profit Margin</td><td>10.00%</td></tr>"));
    assert!(html.contains("<tr><td>Free Cash Flow</td><td>-$2,500.00</td></tr>"));
    assert!(html.contains("<tr><td>Interest Coverage</td><td>N/A</td></tr>"));
    assert!(html.contains("<p>Very High</p>"));
    assert!(!html.contains("Price History"));
  }

  #[test]
  fn multiline_text_is_escaped_and_broken() {
    let html = ReportViews::new().unwrap().render_report(&report()).unwrap();

    assert!(html.contains("Line one<br>\nLine two"));
    assert!(html.contains("Companies House Legal Filings:<br>\nLiquidation &lt;notice&gt;"));
  }
}

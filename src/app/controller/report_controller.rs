use std::sync::Arc;
use anyhow::Result;
use serde::{Serialize, Deserialize};

use crate::app::error::ReportError;
use crate::app::services::report_service::{CompanyReport, ReportRequest, ReportService};
use crate::app::views::templates::ReportViews;

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationResponse {
  pub company_name: String,
  pub evaluation: String,
}

pub struct ReportController {
  service: Arc<ReportService>,
  views: ReportViews,
}

impl ReportController {
  pub fn new(service: Arc<ReportService>, views: ReportViews) -> Self {
    ReportController { service, views }
  }

  pub fn index(&self) -> Result<String> {
    self.views.render_index(None, None)
  }

  /// Report page on success; any failure is shown on the input form instead.
  pub async fn report(&self, request: ReportRequest) -> Result<String> {
    let report: Result<CompanyReport, ReportError> = self.service.build_report(&request).await;

    match report {
      Ok(report) => self.views.render_report(&report),
      Err(e) => {
        log::error!("Report request failed: {:?}", e);
        self.views.render_index(Some(&e.to_string()), Some(&request))
      }
    }
  }

  pub async fn evaluate(&self, company_name: &str) -> EvaluationResponse {
    let evaluation: String = match self.service.evaluate(company_name).await {
      Ok(lines) => lines.join("\n"),
      Err(e) => {
        log::error!("Evaluation of {:?} failed: {:?}", company_name, e);
        format!("Error: {}", e)
      }
    };

    return EvaluationResponse { company_name: company_name.trim().to_string(), evaluation };
  }
}

use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use serde::{Serialize, Deserialize};

use crate::app::controller::report_controller::ReportController;
use crate::app::services::report_service::ReportRequest;

#[derive(Deserialize, Serialize)]
pub struct EvaluateRequest {
  #[serde(default)]
  company_name: String,
}

fn html(body: anyhow::Result<String>) -> HttpResponse {
  match body {
    Ok(body) => HttpResponse::Ok().content_type(ContentType::html()).body(body),
    Err(e) => {
      log::error!("Page rendering failed: {:#}", e);
      HttpResponse::InternalServerError().json(serde_json::json!({"error": e.to_string()}))
    }
  }
}

pub struct Routes;

impl Routes {

  pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(Self::index)).route(web::post().to(Self::report)));
    cfg.service(web::resource("/health").route(web::get().to(Self::health)));
    cfg.service(web::resource("/evaluate").route(web::post().to(Self::evaluate)));
  }

  async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
      "status": "ok",
      "Info": "Company research service.",
      "code": 200,
    }))
  }

  async fn index(controller: web::Data<Arc<ReportController>>) -> impl Responder {
    html(controller.index())
  }

  async fn report(controller: web::Data<Arc<ReportController>>, form: web::Form<ReportRequest>) -> impl Responder {
    html(controller.report(form.into_inner()).await)
  }

  async fn evaluate(controller: web::Data<Arc<ReportController>>, request: web::Json<EvaluateRequest>) -> impl Responder {
    HttpResponse::Ok().json(controller.evaluate(&request.company_name).await)
  }
}

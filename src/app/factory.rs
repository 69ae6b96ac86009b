use actix_web::{web, App};
use anyhow::Result;
use std::sync::Arc;

use crate::app::config::Config;
use crate::app::routes::routes::Routes;
use crate::research::analysis::narrative::NarrativeComposer;
use crate::research::analysis::peers::{PeerDiscovery, StaticPeerDirectory};
use crate::research::analysis::resolver::{LlmTickerResolver, PassthroughResolver, TickerResolver};
use crate::research::llm::models::{configured_model, ConfiguredModel};
use crate::research::tools::api::{MarketDataApi, MarketDataProvider};
use crate::research::tools::registry::RegistryClient;

use super::controller::report_controller::ReportController;
use super::services::report_service::ReportService;
use super::views::templates::ReportViews;

/// Everything a worker needs, built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
  pub report_controller: Arc<ReportController>
}

impl AppState {

  pub fn new(app_config: &Config) -> Result<Self> {
    let market: Arc<dyn MarketDataProvider> = Arc::new(MarketDataApi::new(app_config));
    let registry: RegistryClient = RegistryClient::new(app_config);
    let model: Option<ConfiguredModel> = configured_model(app_config);

    let resolver: Arc<dyn TickerResolver> = match &model {
      Some(model) => Arc::new(LlmTickerResolver::new(model.clone())),
      None => Arc::new(PassthroughResolver),
    };
    let peers: Arc<dyn PeerDiscovery> = Arc::new(StaticPeerDirectory::default());

    let report_service: Arc<ReportService> = Arc::new(ReportService::new(market, registry, NarrativeComposer::new(model), resolver, peers));
    let report_controller: Arc<ReportController> = Arc::new(ReportController::new(report_service, ReportViews::new()?));
    Ok(AppState { report_controller })
  }
}

pub struct CreateApp {
  app_state: AppState,
}

impl CreateApp {
  pub fn new(app_state: AppState) -> Self {
    CreateApp { app_state }
  }

  pub fn build_app(&self,) -> App<impl actix_web::dev::ServiceFactory<actix_web::dev::ServiceRequest,Config = (),Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,Error = actix_web::Error,InitError = (),>,> {
    App::new()
    .app_data(web::Data::new(self.app_state.report_controller.clone()))
    .configure(Routes::configure)
  }
}

use actix_web::HttpServer;
use std::env;

use crate::app::config::Config;
use crate::app::factory::{AppState, CreateApp};

mod app;
mod research;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  if env::var_os("RUST_LOG").is_none() {
    env::set_var("RUST_LOG", "actix_web=info,info");
  }
  env_logger::init();

  let config : Config = Config::load();

  let app_state : AppState = AppState::new(&config).map_err(|e| {
    log::error!("Failed to initialise application: {:#}", e);
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
  })?;

  log::info!("Starting company research server on {}:{}", config.bind_address, config.port);

  // A single worker thread serves all requests.
  let server_builder = HttpServer::new(move || {
    let factory: CreateApp = CreateApp::new(app_state.clone());
    factory.build_app().wrap(actix_web::middleware::Logger::default())
  }).workers(1);

  let server = server_builder.bind((config.bind_address.as_str(), config.port))?;

  server.run().await?;

  Ok(())
}

// src/main.rs
use actix_web::{App, HttpServer, middleware, web};
use log::info;
use std::sync::Arc;

mod config;
mod errors;
mod handlers;
mod models;
mod services;
mod views;

use crate::config::AppConfig;
use crate::services::{HistoryStore, HttpClassifier, ImageProcessor, Session};

#[derive(Clone)]
pub struct AppState {
    session: Arc<Session>,
    config: Arc<AppConfig>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting carspot front-end...");

    let config = AppConfig::from_env()?;

    // Initialize services
    let classifier = Arc::new(HttpClassifier::from_config(&config)?);
    let image_processor = Arc::new(ImageProcessor::new());
    let history = if config.seed_history {
        HistoryStore::seeded()
    } else {
        HistoryStore::new()
    };
    let session = Arc::new(Session::new(
        classifier,
        image_processor,
        history,
        config.admin_password.clone(),
    ));

    info!(
        "Prediction service at {} (detect via {}, timeout {}s)",
        config.api_base_url,
        config.detect_endpoint.path(),
        config.request_timeout.as_secs()
    );

    let bind = config.bind.clone();
    let app_state = AppState {
        session,
        config: Arc::new(config),
    };

    info!("Starting HTTP server on {}", bind);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .service(actix_files::Files::new("/static", "static"))
            .configure(handlers::routes)
            .default_service(web::to(handlers::not_found))
    })
    .bind(&bind)?
    .run()
    .await?;

    Ok(())
}

mod classify;
mod config;
mod imaging;
mod recognition;
mod routes;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use classify::classify_service::ClassifyService;
use classify::dispatcher::Dispatcher;
use classify::selector::MethodSelector;
use config::AppConfig;
use imaging::resolver::ImageResolver;
use recognition::visual_recognition::VisualRecognitionClient;
use recognition::ClassificationService;
use routes::{configure_routes, UploadDir};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Configuration failed: {}", e),
            ));
        }
    };

    if let Some(id) = &config.override_classifier_id {
        log::info!("Classifier override active: {}", id);
    }
    log::info!(
        "Serving static images from {}, uploads go to {}",
        config.public_dir.display(),
        config.upload_dir.display()
    );

    let recognition: Arc<dyn ClassificationService> = Arc::new(VisualRecognitionClient::new(
        &config.service_url,
        config.api_key.clone(),
        config.version_date.clone(),
    ));

    let classify_service = ClassifyService::new(
        ImageResolver::new(config.public_dir.clone(), config.upload_dir.clone()),
        MethodSelector::new(
            config.override_classifier_id.clone(),
            config.tuning.classifier_ids(),
            config.tuning.threshold,
        ),
        Dispatcher::new(recognition.clone(), config.tuning.bounded_timeout()),
    );

    let upload_dir = UploadDir(config.upload_dir.clone());
    let public_dir = config.public_dir.clone();
    let bind_address = format!("0.0.0.0:{}", config.port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(classify_service.clone()))
            .app_data(web::Data::from(recognition.clone()))
            .app_data(web::Data::new(upload_dir.clone()))
            .configure(|cfg| configure_routes(cfg, public_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}

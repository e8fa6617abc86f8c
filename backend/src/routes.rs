use actix_files::Files;
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use std::path::PathBuf;

use crate::classify::classify_service::ClassifyService;
use crate::classify::error::ClassifyError;
use crate::imaging::upload::read_classify_form;
use crate::recognition::ClassificationService;

/// Where uploaded `images_file` parts are written.
#[derive(Clone)]
pub struct UploadDir(pub PathBuf);

pub fn configure_routes(cfg: &mut web::ServiceConfig, public_dir: PathBuf) {
    cfg.service(web::resource("/api/classify").route(web::post().to(classify)))
        .service(
            web::resource("/api/classifiers/{classifier_id}").route(web::get().to(get_classifier)),
        )
        .service(web::resource("/ready/{classifier_id}").route(web::get().to(get_classifier)))
        .service(Files::new("/", public_dir));
}

async fn classify(
    req: HttpRequest,
    payload: web::Payload,
    classify_service: web::Data<ClassifyService>,
    upload_dir: web::Data<UploadDir>,
) -> Result<HttpResponse, ClassifyError> {
    let form = read_classify_form(&req, payload, &upload_dir.0).await?;
    let response = classify_service.classify(form).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn get_classifier(
    recognition: web::Data<dyn ClassificationService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ClassifyError> {
    let classifier_id = path.into_inner();
    let classifier = recognition.get_classifier(&classifier_id).await?;
    info!("Retrieved classifier: {}", classifier_id);
    Ok(HttpResponse::Ok().json(classifier))
}

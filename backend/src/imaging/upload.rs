use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpRequest};
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use shared::ClassifierId;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::classify::cleanup::remove_quietly;
use crate::classify::error::ClassifyError;

const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;
const UPLOAD_FIELD: &str = "images_file";

/// Text fields of a classify request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClassifyFields {
    pub url: Option<String>,
    pub image_data: Option<String>,
    pub classifier_id: Option<String>,
}

impl ClassifyFields {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "url" => self.url = Some(value),
            "image_data" => self.image_data = Some(value),
            "classifier_id" => self.classifier_id = Some(value),
            _ => log::debug!("Ignoring form field {}", name),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifyForm {
    pub fields: ClassifyFields,
    /// Where the uploaded `images_file` was written, if one was sent.
    pub images_file: Option<PathBuf>,
}

impl ClassifyForm {
    pub fn url(&self) -> Option<&str> {
        non_empty(&self.fields.url)
    }

    pub fn image_data(&self) -> Option<&str> {
        non_empty(&self.fields.image_data)
    }

    pub fn classifier_id(&self) -> Option<ClassifierId> {
        non_empty(&self.fields.classifier_id).map(ClassifierId::from)
    }
}

/// Reads the classify form from a multipart, urlencoded or JSON body.
pub async fn read_classify_form(
    req: &HttpRequest,
    payload: web::Payload,
    upload_dir: &Path,
) -> Result<ClassifyForm, ClassifyError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::new(req.headers(), payload);
        return read_multipart(multipart, upload_dir).await;
    }

    let body = read_body(payload).await?;
    let fields = if content_type.starts_with("application/json") {
        serde_json::from_slice(&body).map_err(|e| ClassifyError::InvalidBody(e.to_string()))?
    } else {
        let mut fields = ClassifyFields::default();
        for (name, value) in url::form_urlencoded::parse(&body) {
            fields.set(&name, value.into_owned());
        }
        fields
    };

    Ok(ClassifyForm {
        fields,
        images_file: None,
    })
}

async fn read_body(mut payload: web::Payload) -> Result<Vec<u8>, ClassifyError> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| ClassifyError::InvalidBody(e.to_string()))?;
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(ClassifyError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Name used on disk for an upload: `<unix millis>-<original file name>`.
pub fn upload_file_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "upload".to_string());
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), base)
}

async fn read_multipart(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<ClassifyForm, ClassifyError> {
    let mut form = ClassifyForm::default();
    if let Err(e) = read_parts(&mut multipart, upload_dir, &mut form).await {
        if let Some(path) = form.images_file.take() {
            remove_quietly(&path).await;
        }
        return Err(e);
    }
    Ok(form)
}

async fn read_parts(
    multipart: &mut Multipart,
    upload_dir: &Path,
    form: &mut ClassifyForm,
) -> Result<(), ClassifyError> {
    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|e| ClassifyError::InvalidBody(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        if let Some(file_name) = file_name {
            if name != UPLOAD_FIELD || form.images_file.is_some() {
                log::debug!("Skipping file field {}", name);
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| ClassifyError::InvalidBody(e.to_string()))?;
                }
                continue;
            }

            let path = upload_dir.join(upload_file_name(&file_name));
            form.images_file = Some(path.clone());
            let mut file = tokio::fs::File::create(&path).await?;
            let mut written = 0usize;
            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| ClassifyError::InvalidBody(e.to_string()))?;
                written += data.len();
                if written > MAX_BODY_BYTES {
                    return Err(ClassifyError::PayloadTooLarge);
                }
                file.write_all(&data).await?;
            }
            file.flush().await?;
            log::info!("Stored upload {} ({} bytes)", path.display(), written);
        } else {
            let mut value = Vec::new();
            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| ClassifyError::InvalidBody(e.to_string()))?;
                if value.len() + data.len() > MAX_BODY_BYTES {
                    return Err(ClassifyError::PayloadTooLarge);
                }
                value.extend_from_slice(&data);
            }
            let value = String::from_utf8(value)
                .map_err(|_| ClassifyError::InvalidBody(format!("field {} is not UTF-8", name)))?;
            form.fields.set(&name, value);
        }
    }
    Ok(())
}

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use shared::ClassifyMethod;

use super::error::ServiceError;
use super::{ClassificationService, ClassifyParams, ImageLocator};

pub const DEFAULT_VERSION_DATE: &str = "2015-05-19";

/// Client for a Visual Recognition v3 style REST API.
#[derive(Clone)]
pub struct VisualRecognitionClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
    version_date: String,
}

impl VisualRecognitionClient {
    pub fn new(base_url: &str, api_key: String, version_date: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            version_date,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v3/{}", self.base_url, path)
    }

    fn method_path(method: ClassifyMethod) -> &'static str {
        match method {
            ClassifyMethod::Classify => "classify",
            ClassifyMethod::DetectFaces => "detect_faces",
            ClassifyMethod::RecognizeText => "recognize_text",
        }
    }

    fn auth_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("api_key", self.api_key.clone()),
            ("version", self.version_date.clone()),
        ]
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ServiceError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "error": text }));
            return Err(ServiceError::Remote {
                code: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ClassificationService for VisualRecognitionClient {
    async fn call(
        &self,
        method: ClassifyMethod,
        params: &ClassifyParams,
    ) -> Result<Value, ServiceError> {
        let endpoint = self.endpoint(Self::method_path(method));

        let request = match &params.locator {
            ImageLocator::File(path) => {
                let image = tokio::fs::read(path).await?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                let form = Form::new()
                    .part("images_file", Part::bytes(image).file_name(file_name))
                    .text("parameters", params.parameters_json().to_string());

                self.http_client
                    .post(&endpoint)
                    .query(&self.auth_query())
                    .multipart(form)
            }
            ImageLocator::Url(url) => {
                let mut query = self.auth_query();
                query.push(("url", url.clone()));
                if !params.classifier_ids.is_empty() {
                    let ids: Vec<&str> = params.classifier_ids.iter().map(|id| id.as_str()).collect();
                    query.push(("classifier_ids", ids.join(",")));
                }
                if let Some(threshold) = params.threshold {
                    query.push(("threshold", threshold.to_string()));
                }

                self.http_client.get(&endpoint).query(&query)
            }
        };

        log::debug!("Calling {} at {}", method, endpoint);
        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn get_classifier(&self, classifier_id: &str) -> Result<Value, ServiceError> {
        let endpoint = self.endpoint(&format!(
            "classifiers/{}",
            urlencoding::encode(classifier_id)
        ));

        let response = self
            .http_client
            .get(&endpoint)
            .query(&self.auth_query())
            .send()
            .await?;

        Self::read_json(response).await
    }
}

pub mod error;
pub mod visual_recognition;

#[cfg(test)]
pub mod stub;

use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{ClassifierId, ClassifyMethod};
use std::path::PathBuf;

use error::ServiceError;

/// Where the recognition service should read the image from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageLocator {
    File(PathBuf),
    Url(String),
}

impl ImageLocator {
    pub fn image_file_path(&self) -> Option<&PathBuf> {
        match self {
            ImageLocator::File(path) => Some(path),
            ImageLocator::Url(_) => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            ImageLocator::File(_) => None,
            ImageLocator::Url(url) => Some(url),
        }
    }
}

/// Parameters shared by every method of one classification request. Each
/// dispatched call owns its own copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyParams {
    pub locator: ImageLocator,
    pub classifier_ids: Vec<ClassifierId>,
    pub threshold: Option<f64>,
}

impl ClassifyParams {
    /// The `parameters` document sent alongside an uploaded image.
    pub fn parameters_json(&self) -> Value {
        let mut parameters = json!({ "classifier_ids": self.classifier_ids });
        if let Some(threshold) = self.threshold {
            parameters["threshold"] = json!(threshold);
        }
        parameters
    }
}

#[async_trait]
pub trait ClassificationService: Send + Sync {
    async fn call(
        &self,
        method: ClassifyMethod,
        params: &ClassifyParams,
    ) -> Result<Value, ServiceError>;

    async fn get_classifier(&self, classifier_id: &str) -> Result<Value, ServiceError>;
}

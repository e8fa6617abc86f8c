use async_trait::async_trait;
use serde_json::{json, Value};
use shared::ClassifyMethod;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::error::ServiceError;
use super::{ClassificationService, ClassifyParams};

/// Canned reply for one method.
#[derive(Clone)]
pub enum StubReply {
    Ok(Value),
    Fail(u16, Value),
    Delayed(Duration, Value),
}

/// In-memory recognition service that records every call it receives.
#[derive(Default)]
pub struct StubService {
    replies: HashMap<ClassifyMethod, StubReply>,
    calls: Mutex<Vec<(ClassifyMethod, ClassifyParams)>>,
}

impl StubService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, method: ClassifyMethod, reply: StubReply) -> Self {
        self.replies.insert(method, reply);
        self
    }

    /// Answers every method the way the recognition service does: one entry
    /// per image under `images`.
    pub fn all_ok() -> Self {
        Self::new()
            .reply(
                ClassifyMethod::Classify,
                StubReply::Ok(json!({
                    "images": [{ "image": "a.jpg", "classifiers": [{ "classifier_id": "food", "classes": [] }] }],
                    "images_processed": 1,
                    "custom_classes": 2
                })),
            )
            .reply(
                ClassifyMethod::DetectFaces,
                StubReply::Ok(json!({ "images": [{ "image": "a.jpg", "faces": [] }], "images_processed": 1 })),
            )
            .reply(
                ClassifyMethod::RecognizeText,
                StubReply::Ok(json!({ "images": [{ "image": "a.jpg", "text": "hello" }], "images_processed": 1 })),
            )
    }

    pub fn calls(&self) -> Vec<(ClassifyMethod, ClassifyParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassificationService for StubService {
    async fn call(
        &self,
        method: ClassifyMethod,
        params: &ClassifyParams,
    ) -> Result<Value, ServiceError> {
        self.calls.lock().unwrap().push((method, params.clone()));

        match self.replies.get(&method).cloned() {
            Some(StubReply::Ok(value)) => Ok(value),
            Some(StubReply::Delayed(delay, value)) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            Some(StubReply::Fail(code, body)) => Err(ServiceError::Remote { code, body }),
            None => Err(ServiceError::Remote {
                code: 404,
                body: json!({ "error": format!("no reply for {}", method), "code": 404 }),
            }),
        }
    }

    async fn get_classifier(&self, classifier_id: &str) -> Result<Value, ServiceError> {
        if classifier_id == "missing" {
            return Err(ServiceError::Remote {
                code: 404,
                body: json!({ "error": "Classifier not found", "code": 404 }),
            });
        }
        Ok(json!({ "classifier_id": classifier_id, "status": "ready" }))
    }
}

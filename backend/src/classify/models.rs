use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use shared::{ClassifierId, ClassifyMethod, SourceKind};
use std::collections::BTreeMap;

use crate::recognition::error::{ServiceError, ServiceFailure};
use crate::recognition::{ClassifyParams, ImageLocator};

/// An image that is ready to be sent to the recognition service.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub source_kind: SourceKind,
    pub locator: ImageLocator,
}

impl ResolvedImage {
    pub fn uploaded(path: std::path::PathBuf) -> Self {
        Self {
            source_kind: SourceKind::UploadedFile,
            locator: ImageLocator::File(path),
        }
    }

    pub fn local(path: std::path::PathBuf) -> Self {
        Self {
            source_kind: SourceKind::LocalPath,
            locator: ImageLocator::File(path),
        }
    }

    pub fn inline(path: std::path::PathBuf) -> Self {
        Self {
            source_kind: SourceKind::Base64Inline,
            locator: ImageLocator::File(path),
        }
    }

    pub fn remote(url: String) -> Self {
        Self {
            source_kind: SourceKind::RemoteUrl,
            locator: ImageLocator::Url(url),
        }
    }

    /// True when the file on disk was written for this request only.
    pub fn is_materialized(&self) -> bool {
        matches!(
            self.source_kind,
            SourceKind::UploadedFile | SourceKind::Base64Inline
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub image: ResolvedImage,
    pub classifier_ids: Vec<ClassifierId>,
    pub threshold: Option<f64>,
    pub methods: Vec<ClassifyMethod>,
}

impl ClassificationRequest {
    pub fn params(&self) -> ClassifyParams {
        ClassifyParams {
            locator: self.image.locator.clone(),
            classifier_ids: self.classifier_ids.clone(),
            threshold: self.threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Error,
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodOutcome {
    pub method: ClassifyMethod,
    pub status: OutcomeStatus,
    pub value: Option<Value>,
    pub error: Option<ServiceFailure>,
}

impl MethodOutcome {
    pub fn success(method: ClassifyMethod, value: Value) -> Self {
        Self {
            method,
            status: OutcomeStatus::Success,
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(method: ClassifyMethod, error: ServiceError) -> Self {
        let status = match error {
            ServiceError::Timeout(_) => OutcomeStatus::Timeout,
            _ => OutcomeStatus::Error,
        };
        Self {
            method,
            status,
            value: None,
            error: Some(error.into_failure()),
        }
    }
}

/// Merged result of every successful method plus the per-method payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResponse {
    pub merged: Map<String, Value>,
    pub classifier_ids: Option<ClassifierId>,
    pub raw: BTreeMap<String, String>,
}

impl AggregatedResponse {
    pub fn to_json(&self) -> Value {
        let mut body = self.merged.clone();
        if let Some(id) = &self.classifier_ids {
            body.insert("classifier_ids".to_string(), Value::String(id.to_string()));
        }
        let raw = self
            .raw
            .iter()
            .map(|(method, payload)| (method.clone(), Value::String(payload.clone())))
            .collect();
        body.insert("raw".to_string(), Value::Object(raw));
        Value::Object(body)
    }
}

impl Serialize for AggregatedResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

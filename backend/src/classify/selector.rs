use shared::{ClassifierId, ClassifyMethod};

use super::models::{ClassificationRequest, ResolvedImage};

pub const DEFAULT_THRESHOLD: f64 = 0.5;

pub fn default_classifier_ids() -> Vec<ClassifierId> {
    vec![ClassifierId::from("default"), ClassifierId::from("food")]
}

/// Decides which methods run for a request and with which classifiers.
#[derive(Debug, Clone)]
pub struct MethodSelector {
    override_id: Option<ClassifierId>,
    default_classifier_ids: Vec<ClassifierId>,
    threshold: f64,
}

impl Default for MethodSelector {
    fn default() -> Self {
        Self::new(None, default_classifier_ids(), DEFAULT_THRESHOLD)
    }
}

impl MethodSelector {
    pub fn new(
        override_id: Option<ClassifierId>,
        default_classifier_ids: Vec<ClassifierId>,
        threshold: f64,
    ) -> Self {
        Self {
            override_id,
            default_classifier_ids,
            threshold,
        }
    }

    pub fn build_request(
        &self,
        image: ResolvedImage,
        requested: Option<&ClassifierId>,
    ) -> ClassificationRequest {
        // A caller-supplied classifier takes precedence over the override.
        match requested.or(self.override_id.as_ref()) {
            Some(id) => ClassificationRequest {
                image,
                classifier_ids: vec![id.clone()],
                threshold: None,
                methods: vec![ClassifyMethod::Classify],
            },
            None => ClassificationRequest {
                image,
                classifier_ids: self.default_classifier_ids.clone(),
                threshold: Some(self.threshold),
                methods: vec![
                    ClassifyMethod::Classify,
                    ClassifyMethod::DetectFaces,
                    ClassifyMethod::RecognizeText,
                ],
            },
        }
    }
}

use serde::{Deserialize, Serialize};
use shared::ClassifierId;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classify::dispatcher::BOUNDED_METHOD_TIMEOUT;
use crate::classify::selector::{default_classifier_ids, DEFAULT_THRESHOLD};
use crate::recognition::visual_recognition::DEFAULT_VERSION_DATE;

const DEFAULT_SERVICE_URL: &str = "https://gateway-a.watsonplatform.net/visual-recognition/api";
const DEFAULT_TUNING_PATH: &str = "config/classify.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid port: {0}")]
    InvalidPort(String),
    #[error("Invalid recognition service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid classify config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("default_classifier_ids must name at least one classifier")]
    NoDefaultClassifiers,
}

/// Selector and dispatcher tuning, read from `config/classify.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyTuning {
    pub default_classifier_ids: Vec<String>,
    pub threshold: f64,
    pub bounded_method_timeout_secs: u64,
}

impl Default for ClassifyTuning {
    fn default() -> Self {
        Self {
            default_classifier_ids: default_classifier_ids()
                .into_iter()
                .map(|id| id.to_string())
                .collect(),
            threshold: DEFAULT_THRESHOLD,
            bounded_method_timeout_secs: BOUNDED_METHOD_TIMEOUT.as_secs(),
        }
    }
}

impl ClassifyTuning {
    /// A missing file means defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No classify config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let tuning: Self = serde_yaml::from_str(&config_str)?;
        if tuning.default_classifier_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(ConfigError::NoDefaultClassifiers);
        }
        Ok(tuning)
    }

    pub fn classifier_ids(&self) -> Vec<ClassifierId> {
        self.default_classifier_ids
            .iter()
            .map(|id| ClassifierId::from(id.as_str()))
            .collect()
    }

    pub fn bounded_timeout(&self) -> Duration {
        Duration::from_secs(self.bounded_method_timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub service_url: String,
    pub api_key: String,
    pub version_date: String,
    pub override_classifier_id: Option<ClassifierId>,
    pub public_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub tuning: ClassifyTuning,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values behave like unset ones.
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::InvalidPort(port))?,
            None => 3000,
        };

        let service_url = get("VISUAL_RECOGNITION_URL").unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        url::Url::parse(&service_url)?;

        let api_key = get("VISUAL_RECOGNITION_API_KEY")
            .ok_or(ConfigError::Missing("VISUAL_RECOGNITION_API_KEY"))?;

        let tuning_path = get("CLASSIFY_CONFIG").unwrap_or_else(|| DEFAULT_TUNING_PATH.to_string());

        Ok(Self {
            port,
            service_url,
            api_key,
            version_date: get("VISUAL_RECOGNITION_VERSION")
                .unwrap_or_else(|| DEFAULT_VERSION_DATE.to_string()),
            override_classifier_id: get("OVERRIDE_CLASSIFIER_ID").map(ClassifierId::from),
            public_dir: get("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            tuning: ClassifyTuning::load(Path::new(&tuning_path))?,
        })
    }
}

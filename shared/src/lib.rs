use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// The remote recognition operations an image can be submitted to.
///
/// The string form is the wire name used in responses (`raw` keys) and logs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum_macros::Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ClassifyMethod {
    Classify,
    DetectFaces,
    RecognizeText,
}

impl ClassifyMethod {
    /// Face detection and text recognition are slow on the remote side and
    /// are only waited on for a bounded time.
    pub fn is_time_bounded(&self) -> bool {
        matches!(self, ClassifyMethod::DetectFaces | ClassifyMethod::RecognizeText)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum SourceKind {
    UploadedFile,
    LocalPath,
    Base64Inline,
    RemoteUrl,
}

/// Identity of a trained classifier on the recognition service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref)]
#[serde(transparent)]
pub struct ClassifierId(String);

impl From<&str> for ClassifierId {
    fn from(id: &str) -> Self {
        ClassifierId(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn method_wire_names() {
        let names: Vec<String> = ClassifyMethod::iter().map(|m| m.to_string()).collect();
        assert_eq!(names, vec!["classify", "detectFaces", "recognizeText"]);
        assert_eq!(
            ClassifyMethod::from_str("detectFaces").unwrap(),
            ClassifyMethod::DetectFaces
        );
        assert_eq!(
            serde_json::to_string(&ClassifyMethod::RecognizeText).unwrap(),
            "\"recognizeText\""
        );
    }

    #[test]
    fn only_faces_and_text_are_time_bounded() {
        assert!(!ClassifyMethod::Classify.is_time_bounded());
        assert!(ClassifyMethod::DetectFaces.is_time_bounded());
        assert!(ClassifyMethod::RecognizeText.is_time_bounded());
    }

    #[test]
    fn classifier_id_is_transparent() {
        let id = ClassifierId::from("custom-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"custom-1\"");
        assert_eq!(id.as_str(), "custom-1");
    }
}

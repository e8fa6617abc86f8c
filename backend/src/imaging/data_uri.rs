use base64::{engine::general_purpose, Engine};

use crate::classify::error::ClassifyError;

/// Image decoded from a `data:image/<subtype>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub extension: String,
    pub data: Vec<u8>,
}

fn is_subtype_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '-' | '+' | '/')
}

pub fn parse_base64_image(input: &str) -> Result<DecodedImage, ClassifyError> {
    let rest = input
        .strip_prefix("data:image/")
        .ok_or(ClassifyError::MalformedImageData)?;
    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or(ClassifyError::MalformedImageData)?;

    if subtype.is_empty() || !subtype.chars().all(is_subtype_char) {
        return Err(ClassifyError::MalformedImageData);
    }
    if payload.is_empty() || payload.contains(['\n', '\r']) {
        return Err(ClassifyError::MalformedImageData);
    }

    let data = general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| ClassifyError::MalformedImageData)?;

    let extension = match subtype {
        "jpeg" => "jpg".to_string(),
        // Only used as a file extension.
        other => other.replace('/', "_"),
    };

    Ok(DecodedImage { extension, data })
}

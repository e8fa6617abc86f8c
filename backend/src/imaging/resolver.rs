use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use super::data_uri::parse_base64_image;
use super::upload::ClassifyForm;
use crate::classify::error::ClassifyError;
use crate::classify::models::ResolvedImage;

/// Static-relative URLs start with this prefix and live under the public dir.
const LOCAL_IMAGE_PREFIX: &str = "images";

/// Turns whichever image source a request carries into one resolved image.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    public_dir: PathBuf,
    temp_dir: PathBuf,
}

impl ImageResolver {
    pub fn new(public_dir: PathBuf, temp_dir: PathBuf) -> Self {
        Self {
            public_dir,
            temp_dir,
        }
    }

    /// First match wins: upload, static path, base64 data, remote URL.
    pub async fn resolve(&self, form: &ClassifyForm) -> Result<ResolvedImage, ClassifyError> {
        if let Some(path) = &form.images_file {
            return Ok(ResolvedImage::uploaded(path.clone()));
        }

        if let Some(url) = form.url().filter(|url| url.starts_with(LOCAL_IMAGE_PREFIX)) {
            return self.local_image(url).map(ResolvedImage::local);
        }

        if let Some(image_data) = form.image_data() {
            let image = parse_base64_image(image_data)?;
            let path = self
                .temp_dir
                .join(format!("{}.{}", Uuid::new_v4(), image.extension));
            tokio::fs::write(&path, &image.data).await?;
            log::debug!("Wrote inline image to {}", path.display());
            return Ok(ResolvedImage::inline(path));
        }

        if let Some(url) = form.url() {
            return Ok(ResolvedImage::remote(url.to_string()));
        }

        Err(ClassifyError::MalformedInput)
    }

    fn local_image(&self, url: &str) -> Result<PathBuf, ClassifyError> {
        let relative = Path::new(url);
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(ClassifyError::MalformedInput);
        }
        Ok(self.public_dir.join(relative))
    }
}

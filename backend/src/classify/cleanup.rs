use std::path::Path;

use super::models::ResolvedImage;
use crate::recognition::ImageLocator;

/// Deletes `path`, logging instead of failing.
pub async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("Deleted temporary image {}", path.display()),
        Err(e) => log::warn!("Error deleting {}: {}", path.display(), e),
    }
}

/// Releases the image of a finished request. Files written for the request
/// are deleted; static assets and remote URLs are left alone. Returns whether
/// a deletion was attempted.
pub async fn release(image: ResolvedImage) -> bool {
    if !image.is_materialized() {
        return false;
    }
    match &image.locator {
        ImageLocator::File(path) => {
            remove_quietly(path).await;
            true
        }
        ImageLocator::Url(_) => false,
    }
}

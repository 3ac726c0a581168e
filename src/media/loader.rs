/// Gallery loader
///
/// Gets a gallery's photos either from the JSON compiled into the binary or
/// from a photo document under the site root. Loading is one-shot and never
/// retried: a missing or broken document simply means an empty gallery.
use std::path::PathBuf;
use thiserror::Error;

use crate::config::DataSource;
use crate::state::data::{Photo, PhotoDocument};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid photo document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load a gallery's photos in display order
pub async fn try_load(source: DataSource, root: PathBuf) -> Result<Vec<Photo>, LoadError> {
    let document = match source {
        DataSource::Embedded(json) => PhotoDocument::from_json(json)?,
        DataSource::Document(relative) => {
            let path = root.join(relative);
            let json = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| LoadError::Io { path, source })?;
            PhotoDocument::from_json(&json)?
        }
    };

    Ok(document.into_sequence())
}

/// Like [`try_load`], but any failure yields an empty gallery
pub async fn load_gallery(source: DataSource, root: PathBuf) -> Vec<Photo> {
    match try_load(source, root).await {
        Ok(photos) => photos,
        Err(e) => {
            tracing::warn!("⚠️  Photo data unavailable, showing empty gallery: {}", e);
            Vec::new()
        }
    }
}

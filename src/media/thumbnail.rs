use image::{imageops::FilterType, DynamicImage};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Size of generated thumbnails (longest edge)
const THUMBNAIL_SIZE: u32 = 256;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Get the thumbnail cache directory
/// Returns ~/.cache/photo-gallery/thumbnails on Linux
pub fn get_thumbnail_cache_dir() -> Result<PathBuf, ThumbnailError> {
    let mut path = dirs_next::cache_dir()
        .or_else(dirs_next::home_dir)
        .ok_or(ThumbnailError::NoCacheDir)?;

    path.push("photo-gallery");
    path.push("thumbnails");

    fs::create_dir_all(&path)?;
    Ok(path)
}

/// Generate (or reuse) a thumbnail for one photo.
///
/// `cache_name` must be unique per photo across galleries, e.g. `hiking-3`.
pub fn generate_thumbnail(
    image_path: &Path,
    cache_dir: &Path,
    cache_name: &str,
) -> Result<PathBuf, ThumbnailError> {
    let thumbnail_path = cache_dir.join(format!("{cache_name}.jpg"));

    if is_fresh(image_path, &thumbnail_path) {
        return Ok(thumbnail_path);
    }

    let img = image::open(image_path)?;
    let thumbnail = img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(thumbnail.to_rgb8()).save(&thumbnail_path)?;

    tracing::debug!("📸 Generated thumbnail: {}", thumbnail_path.display());
    Ok(thumbnail_path)
}

/// A cached thumbnail is reusable if it is at least as new as its source
fn is_fresh(image_path: &Path, thumbnail_path: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();

    match (modified(image_path), modified(thumbnail_path)) {
        (Some(source), Some(thumbnail)) => thumbnail >= source,
        _ => false,
    }
}

/// Background thumbnail generation for one grid card
///
/// Errors are flattened to a message so the result can travel inside
/// application messages.
pub async fn load_thumbnail(image_path: PathBuf, cache_name: String) -> Result<PathBuf, String> {
    tokio::task::spawn_blocking(move || {
        let cache_dir = get_thumbnail_cache_dir().map_err(|e| e.to_string())?;
        generate_thumbnail(&image_path, &cache_dir, &cache_name).map_err(|e| {
            tracing::warn!("⚠️  Image failed to load {}: {}", image_path.display(), e);
            e.to_string()
        })
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}

//! Site and gallery configuration
//!
//! A site root holds `images/hobbies/<category>/` folders and, for galleries
//! that are not compiled in, `data/<category>-photos.json` documents.

use std::path::{Path, PathBuf};

use crate::state::data::Photo;

/// Photo document compiled into the binary for the hiking gallery
const HIKING_PHOTOS: &str = include_str!("../data/hiking-photos.json");
/// Photo document compiled into the binary for the cycling gallery
const CYCLING_PHOTOS: &str = include_str!("../data/cycling-photos.json");

/// Image formats a gallery folder is expected to contain
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Where a gallery's photo document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// JSON text shipped inside the binary
    Embedded(&'static str),
    /// JSON document relative to the site root
    Document(PathBuf),
}

/// Everything that differs between one gallery and another
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub category: String,
    pub title: String,
    pub image_base_path: PathBuf,
    pub storage_key: String,
    pub data_source: DataSource,
}

impl GalleryConfig {
    pub fn new(category: &str, title: &str, data_source: DataSource) -> Self {
        Self {
            category: category.to_string(),
            title: title.to_string(),
            image_base_path: Path::new("images").join("hobbies").join(category),
            storage_key: storage_key_for(category),
            data_source,
        }
    }

    /// Gallery whose photo document lives at `data/<category>-photos.json`
    pub fn from_document(category: &str, title: &str) -> Self {
        let document = Path::new("data").join(format!("{category}-photos.json"));
        Self::new(category, title, DataSource::Document(document))
    }
}

/// Storage key holding a gallery's caption overlay
pub fn storage_key_for(category: &str) -> String {
    format!("{category}PhotoCaptions")
}

/// The site being browsed
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub root: PathBuf,
    pub galleries: Vec<GalleryConfig>,
}

impl SiteConfig {
    /// The stock hiking, travel and cycling galleries rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            galleries: vec![
                GalleryConfig::new("hiking", "Hiking", DataSource::Embedded(HIKING_PHOTOS)),
                GalleryConfig::from_document("travel", "Travel"),
                GalleryConfig::new("cycling", "Cycling", DataSource::Embedded(CYCLING_PHOTOS)),
            ],
        }
    }

    /// Site rooted at the working directory
    pub fn from_current_dir() -> Self {
        let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(root)
    }

    /// Full path of a photo's image file
    pub fn image_path(&self, gallery: &GalleryConfig, photo: &Photo) -> PathBuf {
        self.root.join(&gallery.image_base_path).join(&photo.file)
    }
}

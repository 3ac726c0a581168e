/// Shared data structures for the gallery state
///
/// These structs represent the data model that flows between
/// the photo documents on disk and the UI layer.
use serde::{Deserialize, Serialize};

/// Represents a single photo in a gallery
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    /// Stable ID, unique within its gallery
    pub id: i64,
    /// File name relative to the gallery's image folder
    pub file: String,
    /// User caption (empty = no caption)
    #[serde(default)]
    pub caption: String,
    /// Display order; photo documents without it keep their array order
    #[serde(default)]
    pub order: i64,
}

impl Photo {
    pub fn new(id: i64, file: impl Into<String>) -> Self {
        Self {
            id,
            file: file.into(),
            caption: String::new(),
            order: id,
        }
    }

    pub fn has_caption(&self) -> bool {
        !self.caption.is_empty()
    }
}

/// A photo document: `{ "photos": [...] }`
///
/// The scan tooling also writes `lastUpdated` and `totalPhotos`; both are
/// accepted but never used for sequencing.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDocument {
    pub photos: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_photos: Option<usize>,
}

impl PhotoDocument {
    /// Parse from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Photos in display order.
    ///
    /// Stable sort: equal `order` values keep document position.
    pub fn into_sequence(self) -> Vec<Photo> {
        let mut photos = self.photos;
        photos.sort_by_key(|photo| photo.order);
        photos
    }
}

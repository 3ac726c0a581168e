/// Caption overlay: the persisted id → caption mapping
///
/// Stored as a JSON object keyed by the photo id as a string,
/// e.g. `{"1":"Sea cliffs","4":"Summit"}`. Only non-empty captions
/// are ever written.
use std::collections::BTreeMap;

use super::data::Photo;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionOverlay {
    captions: BTreeMap<i64, String>,
}

impl CaptionOverlay {
    /// Collect the non-empty captions of a gallery
    pub fn from_photos(photos: &[Photo]) -> Self {
        let captions = photos
            .iter()
            .filter(|photo| photo.has_caption())
            .map(|photo| (photo.id, photo.caption.clone()))
            .collect();
        Self { captions }
    }

    /// Parse a stored overlay.
    ///
    /// Returns `None` unless the text is a JSON object. Entries whose key is
    /// not an integer, or whose value is not a non-empty string, are skipped.
    pub fn parse(json: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(json).ok()?;
        let object = value.as_object()?;

        let captions = object
            .iter()
            .filter_map(|(key, value)| {
                let id = key.trim().parse::<i64>().ok()?;
                let caption = value.as_str()?;
                (!caption.is_empty()).then(|| (id, caption.to_string()))
            })
            .collect();

        Some(Self { captions })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.captions)
    }

    #[cfg(test)]
    pub fn get(&self, id: i64) -> Option<&str> {
        self.captions.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    /// Overwrite the captions of matching photos.
    ///
    /// Returns the indices of the photos that were touched so the
    /// caller can redraw just those cards.
    pub fn apply(&self, photos: &mut [Photo]) -> Vec<usize> {
        let mut touched = Vec::new();
        for (index, photo) in photos.iter_mut().enumerate() {
            if let Some(caption) = self.captions.get(&photo.id) {
                photo.caption = caption.clone();
                touched.push(index);
            }
        }
        touched
    }
}

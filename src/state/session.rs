/// Gallery session: one gallery's photos plus the carousel and caption editor
///
/// Every operation returns an optional [`Change`] describing what happened.
/// The application feeds those notifications to the grid and carousel views
/// instead of letting the views reach into the session's state.
use crate::config::GalleryConfig;

use super::captions::CaptionOverlay;
use super::data::Photo;
use super::storage::{KeyValueStore, StorageError};

/// Whether the photo document has arrived yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
}

/// Caption editor sub-state, only meaningful while the carousel is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor {
    Viewing,
    Editing { draft: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Carousel {
    Closed,
    Open { cursor: usize, editor: Editor },
}

/// Notifications emitted by session operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Photos arrived; `patched` are the cards whose caption came from storage
    Loaded { count: usize, patched: Vec<usize> },
    /// Stored captions were applied onto already-loaded photos
    CaptionsRestored { patched: Vec<usize> },
    Opened { index: usize },
    Moved { index: usize },
    Closed,
    EditStarted,
    EditCancelled,
    /// Caption written in memory; `persisted` is false when storage failed
    CaptionSaved { index: usize, persisted: bool },
}

#[derive(Debug)]
pub struct GallerySession {
    config: GalleryConfig,
    status: LoadStatus,
    photos: Vec<Photo>,
    pending_overlay: Option<CaptionOverlay>,
    carousel: Carousel,
}

impl GallerySession {
    pub fn new(config: GalleryConfig) -> Self {
        Self {
            config,
            status: LoadStatus::Loading,
            photos: Vec::new(),
            pending_overlay: None,
            carousel: Carousel::Closed,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn is_open(&self) -> bool {
        matches!(self.carousel, Carousel::Open { .. })
    }

    pub fn cursor(&self) -> Option<usize> {
        match self.carousel {
            Carousel::Open { cursor, .. } => Some(cursor),
            Carousel::Closed => None,
        }
    }

    /// The photo under the cursor
    pub fn current(&self) -> Option<&Photo> {
        self.cursor().and_then(|cursor| self.photos.get(cursor))
    }

    /// The editor's draft text, if editing
    pub fn draft(&self) -> Option<&str> {
        match &self.carousel {
            Carousel::Open {
                editor: Editor::Editing { draft },
                ..
            } => Some(draft),
            _ => None,
        }
    }

    /// 1-based "position / total" text
    pub fn counter(&self) -> Option<String> {
        self.cursor()
            .map(|cursor| format!("{} / {}", cursor + 1, self.photos.len()))
    }

    pub fn photo_count_label(&self) -> String {
        match self.photos.len() {
            0 => "No photos yet".to_string(),
            1 => "1 photo".to_string(),
            n => format!("{n} photos"),
        }
    }

    /// Read the stored caption overlay.
    ///
    /// Unreadable storage and malformed JSON both count as "no saved
    /// captions". If the photos have not arrived yet the overlay is held
    /// until [`finish_load`](Self::finish_load).
    pub fn restore(&mut self, store: &dyn KeyValueStore) -> Option<Change> {
        let raw = match store.get(&self.config.storage_key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(
                    "⚠️  Could not read {}: {}",
                    self.config.storage_key,
                    e
                );
                return None;
            }
        };

        let Some(overlay) = CaptionOverlay::parse(&raw) else {
            tracing::warn!(
                "⚠️  Ignoring malformed captions under {}",
                self.config.storage_key
            );
            return None;
        };

        tracing::debug!(
            "📝 {} saved captions under {}",
            overlay.len(),
            self.config.storage_key
        );

        match self.status {
            LoadStatus::Loading => {
                self.pending_overlay = Some(overlay);
                None
            }
            LoadStatus::Ready => {
                let patched = overlay.apply(&mut self.photos);
                Some(Change::CaptionsRestored { patched })
            }
        }
    }

    /// Install the loaded photos (possibly none) and apply any held overlay
    pub fn finish_load(&mut self, photos: Vec<Photo>) -> Change {
        self.photos = photos;
        self.status = LoadStatus::Ready;
        self.carousel = Carousel::Closed;

        let patched = match self.pending_overlay.take() {
            Some(overlay) => overlay.apply(&mut self.photos),
            None => Vec::new(),
        };

        tracing::info!(
            "🖼️  {} gallery ready: {} photos, {} saved captions",
            self.config.category,
            self.photos.len(),
            patched.len()
        );

        Change::Loaded {
            count: self.photos.len(),
            patched,
        }
    }

    /// Open the carousel at `index`. No-op for an out-of-range index,
    /// which includes every index of an empty gallery.
    pub fn open(&mut self, index: usize) -> Option<Change> {
        if index >= self.photos.len() {
            return None;
        }
        self.carousel = Carousel::Open {
            cursor: index,
            editor: Editor::Viewing,
        };
        Some(Change::Opened { index })
    }

    /// Close the carousel, discarding any unsaved edit
    pub fn close(&mut self) -> Option<Change> {
        if !self.is_open() {
            return None;
        }
        self.carousel = Carousel::Closed;
        Some(Change::Closed)
    }

    pub fn next(&mut self) -> Option<Change> {
        self.step(1)
    }

    pub fn prev(&mut self) -> Option<Change> {
        self.step(-1)
    }

    /// Move the cursor with wraparound. Leaves the editor.
    fn step(&mut self, direction: isize) -> Option<Change> {
        let len = self.photos.len();
        let Carousel::Open { cursor, .. } = self.carousel else {
            return None;
        };
        if len == 0 {
            return None;
        }

        let index = (cursor as isize + direction).rem_euclid(len as isize) as usize;
        self.carousel = Carousel::Open {
            cursor: index,
            editor: Editor::Viewing,
        };
        Some(Change::Moved { index })
    }

    /// Enter editing with the current caption as the draft
    pub fn start_edit(&mut self) -> Option<Change> {
        let caption = self.current()?.caption.clone();
        if let Carousel::Open { editor, .. } = &mut self.carousel {
            *editor = Editor::Editing { draft: caption };
        }
        Some(Change::EditStarted)
    }

    pub fn set_draft(&mut self, text: String) {
        if let Carousel::Open {
            editor: Editor::Editing { draft },
            ..
        } = &mut self.carousel
        {
            *draft = text;
        }
    }

    pub fn cancel_edit(&mut self) -> Option<Change> {
        match &mut self.carousel {
            Carousel::Open { editor, .. } if matches!(editor, Editor::Editing { .. }) => {
                *editor = Editor::Viewing;
                Some(Change::EditCancelled)
            }
            _ => None,
        }
    }

    /// Commit the trimmed draft to the current photo and persist the
    /// gallery's whole caption overlay. An empty draft clears the caption.
    pub fn save(&mut self, store: &mut dyn KeyValueStore) -> Option<Change> {
        let Carousel::Open {
            cursor,
            editor: Editor::Editing { draft },
        } = &self.carousel
        else {
            return None;
        };
        let index = *cursor;
        let caption = draft.trim().to_string();

        self.photos.get_mut(index)?.caption = caption;
        self.carousel = Carousel::Open {
            cursor: index,
            editor: Editor::Viewing,
        };

        let persisted = match self.persist(store) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "❌ Failed to save captions under {}: {}",
                    self.config.storage_key,
                    e
                );
                false
            }
        };

        Some(Change::CaptionSaved { index, persisted })
    }

    fn persist(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let overlay = CaptionOverlay::from_photos(&self.photos);
        if overlay.is_empty() {
            store.remove(&self.config.storage_key)?;
            tracing::debug!("💾 Cleared {}", self.config.storage_key);
            return Ok(());
        }

        let json = overlay.to_json()?;
        store.set(&self.config.storage_key, &json)?;
        tracing::debug!(
            "💾 Saved {} captions under {}",
            overlay.len(),
            self.config.storage_key
        );
        Ok(())
    }
}

use iced::keyboard::{self, key, Key};
use iced::time::{Duration, Instant};
use iced::widget::{button, column, container, horizontal_space, row, scrollable, stack, text};
use iced::{event, Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod media;
mod state;
mod ui;

use config::SiteConfig;
use state::data::Photo;
use state::session::{Change, GallerySession, LoadStatus};
use state::storage::{KeyValueStore, MemoryStore, SqliteStore};
use ui::grid::GridView;
use ui::swipe::{Swipe, SwipeTracker};
use ui::toast::{Phase, Toast};

/// Main application state
struct PhotoGallery {
    /// The site being browsed
    site: SiteConfig,
    /// Caption storage shared by every gallery
    store: Box<dyn KeyValueStore>,
    /// One session per gallery, same order as `site.galleries`
    sessions: Vec<GallerySession>,
    /// One grid per gallery
    grids: Vec<GridView>,
    /// Index of the gallery being shown
    active: usize,
    /// Bumped on every site (re)load so late results from an old site are dropped
    generation: u64,
    swipe: SwipeTracker,
    toast: Option<Toast>,
    now: Instant,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    SelectGallery(usize),
    GalleryLoaded {
        generation: u64,
        gallery: usize,
        photos: Vec<Photo>,
    },
    ThumbnailLoaded {
        generation: u64,
        gallery: usize,
        index: usize,
        result: Result<PathBuf, String>,
    },
    OpenPhoto(usize),
    ClosePhoto,
    NextPhoto,
    PrevPhoto,
    StartEdit,
    CaptionInput(String),
    SaveCaption,
    CancelEdit,
    SwipeStart(f32),
    SwipeEnd(f32),
    SwipeCancel,
    /// A touch landed on the modal content rather than its backdrop
    ContentTouched,
    Tick(Instant),
    /// User clicked the "Open Site Folder" button
    OpenSiteFolder,
}

impl PhotoGallery {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // Captions still work for this run if the database is unavailable
        let store: Box<dyn KeyValueStore> = match SqliteStore::open() {
            Ok(store) => {
                if let Some(path) = store.path() {
                    tracing::info!("📁 Caption store opened at: {}", path.display());
                }
                Box::new(store)
            }
            Err(e) => {
                tracing::warn!("⚠️  Caption store unavailable, captions will not persist: {}", e);
                Box::new(MemoryStore::new())
            }
        };

        let (app, task) = Self::with_store(SiteConfig::from_current_dir(), store);
        tracing::info!("🎨 Photo Gallery initialized at {}", app.site.root.display());

        (app, task)
    }

    /// Build the application around an already opened caption store
    fn with_store(site: SiteConfig, store: Box<dyn KeyValueStore>) -> (Self, Task<Message>) {
        let mut app = PhotoGallery {
            site: site.clone(),
            store,
            sessions: Vec::new(),
            grids: Vec::new(),
            active: 0,
            generation: 0,
            swipe: SwipeTracker::default(),
            toast: None,
            now: Instant::now(),
        };

        let task = app.load_site(site);
        (app, task)
    }

    /// Start fresh sessions for every gallery of `site` and kick off their loads
    fn load_site(&mut self, site: SiteConfig) -> Task<Message> {
        self.generation += 1;
        let generation = self.generation;

        self.sessions = site
            .galleries
            .iter()
            .cloned()
            .map(GallerySession::new)
            .collect();

        // Overlays are held by each session until its photos arrive
        for session in &mut self.sessions {
            session.restore(self.store.as_ref());
        }

        self.grids = vec![GridView::default(); self.sessions.len()];
        self.active = 0;
        self.swipe.cancel();

        let loads = site.galleries.iter().enumerate().map(|(gallery, config)| {
            Task::perform(
                media::loader::load_gallery(config.data_source.clone(), site.root.clone()),
                move |photos| Message::GalleryLoaded {
                    generation,
                    gallery,
                    photos,
                },
            )
        });
        let task = Task::batch(loads);

        self.site = site;
        task
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectGallery(gallery) => {
                if gallery < self.sessions.len() && gallery != self.active {
                    if let Some(session) = self.sessions.get_mut(self.active) {
                        session.close();
                    }
                    self.active = gallery;
                }
                Task::none()
            }
            Message::GalleryLoaded {
                generation,
                gallery,
                photos,
            } => {
                if generation != self.generation {
                    return Task::none();
                }
                let Some(session) = self.sessions.get_mut(gallery) else {
                    return Task::none();
                };
                let change = session.finish_load(photos);
                self.apply_change(gallery, change)
            }
            Message::ThumbnailLoaded {
                generation,
                gallery,
                index,
                result,
            } => {
                if generation == self.generation {
                    if let Some(grid) = self.grids.get_mut(gallery) {
                        grid.set_image(index, result);
                    }
                }
                Task::none()
            }
            Message::OpenPhoto(index) => self.with_active(|session, _| session.open(index)),
            Message::ClosePhoto => self.with_active(|session, _| session.close()),
            Message::NextPhoto => self.with_active(|session, _| session.next()),
            Message::PrevPhoto => self.with_active(|session, _| session.prev()),
            Message::StartEdit => self.with_active(|session, _| session.start_edit()),
            Message::CaptionInput(text) => {
                if let Some(session) = self.sessions.get_mut(self.active) {
                    session.set_draft(text);
                }
                Task::none()
            }
            Message::SaveCaption => self.with_active(|session, store| session.save(store)),
            Message::CancelEdit => self.with_active(|session, _| session.cancel_edit()),
            Message::SwipeStart(x) => {
                self.swipe.begin(x);
                Task::none()
            }
            Message::SwipeEnd(x) => match self.swipe.finish(x) {
                Some(Swipe::Next) => self.with_active(|session, _| session.next()),
                Some(Swipe::Prev) => self.with_active(|session, _| session.prev()),
                None => Task::none(),
            },
            Message::SwipeCancel => {
                self.swipe.cancel();
                Task::none()
            }
            Message::ContentTouched => Task::none(),
            Message::Tick(now) => {
                self.now = now;
                if let Some(toast) = &self.toast {
                    if toast.phase(now) == Phase::Expired {
                        self.toast = None;
                    }
                }
                Task::none()
            }
            Message::OpenSiteFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select Site Folder")
                    .pick_folder();

                match folder {
                    Some(root) => {
                        tracing::info!("📂 Opening site at {}", root.display());
                        self.load_site(SiteConfig::new(root))
                    }
                    None => Task::none(),
                }
            }
        }
    }

    /// Run a session operation on the active gallery and apply its notification
    fn with_active(
        &mut self,
        operation: impl FnOnce(&mut GallerySession, &mut dyn KeyValueStore) -> Option<Change>,
    ) -> Task<Message> {
        let gallery = self.active;
        let Some(session) = self.sessions.get_mut(gallery) else {
            return Task::none();
        };
        match operation(session, self.store.as_mut()) {
            Some(change) => self.apply_change(gallery, change),
            None => Task::none(),
        }
    }

    /// Route a session notification to the views
    fn apply_change(&mut self, gallery: usize, change: Change) -> Task<Message> {
        let (Some(session), Some(grid)) = (self.sessions.get(gallery), self.grids.get_mut(gallery))
        else {
            return Task::none();
        };

        match change {
            Change::Loaded { count, patched } => {
                *grid = GridView::build(session.photos());
                tracing::debug!(
                    "🧱 Grid {} rebuilt: {} cards, {} with saved captions",
                    gallery,
                    count,
                    patched.len()
                );
                self.load_thumbnails(gallery)
            }
            Change::CaptionsRestored { patched } => {
                for index in patched {
                    if let Some(photo) = session.photos().get(index) {
                        grid.patch_caption(index, photo);
                    }
                }
                Task::none()
            }
            Change::Opened { index } | Change::Moved { index } => {
                ui::carousel::scroll_to_cursor(index, session.photos().len())
            }
            Change::EditStarted => ui::carousel::focus_caption_input(),
            Change::CaptionSaved { index, persisted } => {
                if let Some(photo) = session.photos().get(index) {
                    grid.patch_caption(index, photo);
                }
                self.toast = Some(if persisted {
                    Toast::new("Caption saved!")
                } else {
                    Toast::new("Caption kept for this session only")
                });
                self.now = Instant::now();
                Task::none()
            }
            Change::Closed | Change::EditCancelled => Task::none(),
        }
    }

    /// Generate card thumbnails in the background, one task per photo
    fn load_thumbnails(&self, gallery: usize) -> Task<Message> {
        let (Some(session), Some(config)) =
            (self.sessions.get(gallery), self.site.galleries.get(gallery))
        else {
            return Task::none();
        };
        let generation = self.generation;

        Task::batch(session.photos().iter().enumerate().map(|(index, photo)| {
            let image_path = self.site.image_path(config, photo);
            let cache_name = format!("{}-{}", config.category, photo.id);
            Task::perform(
                media::thumbnail::load_thumbnail(image_path, cache_name),
                move |result| Message::ThumbnailLoaded {
                    generation,
                    gallery,
                    index,
                    result,
                },
            )
        }))
    }

    fn subscription(&self) -> Subscription<Message> {
        // Arrows only arrive when no widget captured them; Escape is in `modal_events`
        let mut subscriptions = vec![keyboard::on_key_press(|pressed, _modifiers| {
            match pressed.as_ref() {
                Key::Named(key::Named::ArrowLeft) => Some(Message::PrevPhoto),
                Key::Named(key::Named::ArrowRight) => Some(Message::NextPhoto),
                _ => None,
            }
        })];

        let open = self
            .sessions
            .get(self.active)
            .is_some_and(GallerySession::is_open);
        if open {
            subscriptions.push(event::listen_with(ui::carousel::modal_events));
        }

        if self.toast.is_some() {
            subscriptions.push(iced::time::every(Duration::from_millis(50)).map(Message::Tick));
        }

        Subscription::batch(subscriptions)
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let Some(session) = self.sessions.get(self.active) else {
            return container(text("No galleries configured").size(20))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into();
        };
        let grid = &self.grids[self.active];

        let tabs = row(self.site.galleries.iter().enumerate().map(|(index, gallery)| {
            let style: fn(&Theme, button::Status) -> button::Style = if index == self.active {
                button::primary
            } else {
                button::secondary
            };
            button(text(&gallery.title))
                .style(style)
                .padding([8, 16])
                .on_press(Message::SelectGallery(index))
                .into()
        }))
        .spacing(10);

        let header = row![
            text(&session.config().title).size(36),
            text(session.photo_count_label()).size(16),
            horizontal_space(),
            button("Open Site Folder")
                .on_press(Message::OpenSiteFolder)
                .padding(10),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let loading = session.status() == LoadStatus::Loading;
        let content = column![
            header,
            tabs,
            scrollable(grid.view(session.config(), loading)).height(Length::Fill),
        ]
        .spacing(20)
        .padding(30);

        let mut screen: Element<'_, Message> = content.into();

        if let Some(modal) = ui::carousel::view(session, grid, &self.site) {
            screen = ui::carousel::overlay(screen, modal);
        }

        if let Some(toast) = &self.toast {
            screen = stack![screen, toast.view(self.now)].into();
        }

        screen
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    iced::application("Photo Gallery", PhotoGallery::update, PhotoGallery::view)
        .subscription(PhotoGallery::subscription)
        .theme(PhotoGallery::theme)
        .centered()
        .run_with(PhotoGallery::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::StorageError;
    use crate::ui::grid::{CardImage, GridState, CAPTION_PLACEHOLDER};
    use iced::keyboard::key::{Code, Physical};
    use iced::keyboard::{Location, Modifiers};
    use iced::window;
    use std::path::Path;
    use tempfile::TempDir;

    /// A store that fails every call, like a locked or unwritable database
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::NoDataDir)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDataDir)
        }
        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::NoDataDir)
        }
    }

    fn app_with(root: &Path, store: Box<dyn KeyValueStore>) -> PhotoGallery {
        let (app, _loads) = PhotoGallery::with_store(SiteConfig::new(root), store);
        app
    }

    fn app_at(root: &Path) -> PhotoGallery {
        app_with(root, Box::new(MemoryStore::new()))
    }

    fn photos(n: i64) -> Vec<Photo> {
        (1..=n).map(|id| Photo::new(id, format!("{id}.jpg"))).collect()
    }

    fn send(app: &mut PhotoGallery, message: Message) {
        let _ = app.update(message);
    }

    fn load(app: &mut PhotoGallery, gallery: usize, photos: Vec<Photo>) {
        let generation = app.generation;
        send(
            app,
            Message::GalleryLoaded {
                generation,
                gallery,
                photos,
            },
        );
    }

    fn cursor(app: &PhotoGallery) -> Option<usize> {
        app.sessions[app.active].cursor()
    }

    fn swipe(app: &mut PhotoGallery, from: f32, to: f32) {
        send(app, Message::SwipeStart(from));
        send(app, Message::SwipeEnd(to));
    }

    #[test]
    fn test_saved_caption_reaches_grid_toast_and_store() {
        let root = TempDir::new().unwrap();
        let mut app = app_at(root.path());
        load(&mut app, 0, photos(3));

        send(&mut app, Message::OpenPhoto(0));
        send(&mut app, Message::StartEdit);
        send(&mut app, Message::CaptionInput("  海边 ".to_string()));
        send(&mut app, Message::SaveCaption);

        let grid = &app.grids[0];
        assert_eq!(grid.card(0).map(|c| c.caption_text()), Some("海边"));
        assert_eq!(grid.card(1).map(|c| c.caption_text()), Some(CAPTION_PLACEHOLDER));
        assert_eq!(app.toast.as_ref().map(Toast::message), Some("Caption saved!"));
        assert_eq!(
            app.store.get("hikingPhotoCaptions").unwrap().as_deref(),
            Some(r#"{"1":"海边"}"#)
        );
        // Still open on the same photo, back in viewing mode
        assert_eq!(cursor(&app), Some(0));
        assert_eq!(app.sessions[0].draft(), None);
    }

    #[test]
    fn test_failed_save_keeps_caption_for_the_session() {
        let root = TempDir::new().unwrap();
        let mut app = app_with(root.path(), Box::new(BrokenStore));
        load(&mut app, 0, photos(2));

        send(&mut app, Message::OpenPhoto(1));
        send(&mut app, Message::StartEdit);
        send(&mut app, Message::CaptionInput("Summit".to_string()));
        send(&mut app, Message::SaveCaption);

        assert_eq!(app.grids[0].card(1).map(|c| c.caption_text()), Some("Summit"));
        assert_eq!(
            app.toast.as_ref().map(Toast::message),
            Some("Caption kept for this session only")
        );
    }

    #[test]
    fn test_saved_captions_restored_when_site_loads() {
        let root = TempDir::new().unwrap();
        let mut store = MemoryStore::new();
        store.set("hikingPhotoCaptions", r#"{"2":"Pass"}"#).unwrap();

        let mut app = app_with(root.path(), Box::new(store));
        assert_eq!(app.grids[0].state(true), GridState::Loading);
        load(&mut app, 0, photos(3));

        assert_eq!(app.grids[0].card(1).map(|c| c.caption_text()), Some("Pass"));
        assert_eq!(app.grids[0].card(0).map(|c| c.caption_text()), Some(CAPTION_PLACEHOLDER));
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let root = TempDir::new().unwrap();
        let mut app = app_at(root.path());
        let stale = app.generation;
        let _ = app.load_site(SiteConfig::new(root.path()));

        send(
            &mut app,
            Message::GalleryLoaded {
                generation: stale,
                gallery: 0,
                photos: photos(5),
            },
        );
        assert_eq!(app.sessions[0].status(), LoadStatus::Loading);
        assert!(app.grids[0].cards().is_empty());

        load(&mut app, 0, photos(2));
        assert_eq!(app.sessions[0].status(), LoadStatus::Ready);
        assert_eq!(app.grids[0].cards().len(), 2);
    }

    #[test]
    fn test_stale_thumbnail_is_dropped() {
        let root = TempDir::new().unwrap();
        let mut app = app_at(root.path());
        load(&mut app, 0, photos(1));
        let stale = app.generation;
        let _ = app.load_site(SiteConfig::new(root.path()));
        load(&mut app, 0, photos(1));

        send(
            &mut app,
            Message::ThumbnailLoaded {
                generation: stale,
                gallery: 0,
                index: 0,
                result: Err("late".to_string()),
            },
        );
        assert_eq!(app.grids[0].cards()[0].image, CardImage::Pending);
    }

    #[test]
    fn test_swipes_navigate_the_open_carousel() {
        let root = TempDir::new().unwrap();
        let mut app = app_at(root.path());
        load(&mut app, 0, photos(4));

        // Nothing to navigate while closed
        swipe(&mut app, 300.0, 100.0);
        assert_eq!(cursor(&app), None);

        send(&mut app, Message::OpenPhoto(0));
        swipe(&mut app, 300.0, 100.0);
        assert_eq!(cursor(&app), Some(1));

        // 49 px is below the threshold
        swipe(&mut app, 100.0, 149.0);
        assert_eq!(cursor(&app), Some(1));

        swipe(&mut app, 100.0, 220.0);
        assert_eq!(cursor(&app), Some(0));
        swipe(&mut app, 100.0, 220.0);
        assert_eq!(cursor(&app), Some(3));

        send(&mut app, Message::SwipeStart(0.0));
        send(&mut app, Message::SwipeCancel);
        send(&mut app, Message::SwipeEnd(400.0));
        assert_eq!(cursor(&app), Some(3));
    }

    #[test]
    fn test_escape_closes_while_editing() {
        let root = TempDir::new().unwrap();
        let mut app = app_at(root.path());
        load(&mut app, 0, photos(2));

        send(&mut app, Message::OpenPhoto(1));
        send(&mut app, Message::StartEdit);
        send(&mut app, Message::CaptionInput("unsaved".to_string()));

        // The focused caption input captures Escape before anything else sees it
        let escape = iced::Event::Keyboard(keyboard::Event::KeyPressed {
            key: Key::Named(key::Named::Escape),
            modified_key: Key::Named(key::Named::Escape),
            physical_key: Physical::Code(Code::Escape),
            location: Location::Standard,
            modifiers: Modifiers::empty(),
            text: None,
        });
        let message =
            ui::carousel::modal_events(escape, event::Status::Captured, window::Id::unique())
                .unwrap();
        send(&mut app, message);

        assert!(!app.sessions[0].is_open());
        send(&mut app, Message::OpenPhoto(1));
        assert_eq!(app.sessions[0].draft(), None);
        assert_eq!(app.sessions[0].photos()[1].caption, "");
    }

    #[test]
    fn test_switching_gallery_closes_carousel() {
        let root = TempDir::new().unwrap();
        let mut app = app_at(root.path());
        load(&mut app, 0, photos(2));
        load(&mut app, 2, photos(3));

        send(&mut app, Message::OpenPhoto(1));
        send(&mut app, Message::SelectGallery(2));
        assert_eq!(app.active, 2);
        assert!(!app.sessions[0].is_open());

        // Out of range for the new gallery
        send(&mut app, Message::SelectGallery(7));
        assert_eq!(app.active, 2);
    }

    #[tokio::test]
    async fn test_missing_travel_document_shows_empty_state() {
        let root = TempDir::new().unwrap();
        let mut app = app_at(root.path());

        let travel = app.site.galleries[1].clone();
        let loaded =
            media::loader::load_gallery(travel.data_source, root.path().to_path_buf()).await;
        load(&mut app, 1, loaded);
        send(&mut app, Message::SelectGallery(1));

        let session = &app.sessions[app.active];
        assert_eq!(session.status(), LoadStatus::Ready);
        assert_eq!(session.photo_count_label(), "No photos yet");
        let loading = session.status() == LoadStatus::Loading;
        assert_eq!(app.grids[app.active].state(loading), GridState::Empty);

        // Nothing to open in an empty gallery
        send(&mut app, Message::OpenPhoto(0));
        assert!(!app.sessions[app.active].is_open());
    }
}

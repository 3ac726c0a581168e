/// Photo grid
///
/// Keeps one card view-model per photo so a saved caption can be patched
/// into a single card without rebuilding the rest of the grid.
use std::path::PathBuf;

use iced::font::{self, Font};
use iced::widget::{button, column, container, image, text, Column};
use iced::{Alignment, Color, ContentFit, Element, Length};
use iced_aw::Wrap;

use crate::config::{GalleryConfig, SUPPORTED_EXTENSIONS};
use crate::state::data::Photo;
use crate::Message;

/// Card caption shown when a photo has none
pub const CAPTION_PLACEHOLDER: &str = "Click to view details";

const CARD_WIDTH: f32 = 220.0;
const CARD_IMAGE_HEIGHT: f32 = 165.0;

/// State of a card's lazily generated thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardImage {
    Pending,
    Ready(PathBuf),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: i64,
    pub caption: String,
    pub image: CardImage,
}

impl CardView {
    fn from_photo(photo: &Photo) -> Self {
        Self {
            id: photo.id,
            caption: photo.caption.clone(),
            image: CardImage::Pending,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.caption.is_empty()
    }

    pub fn caption_text(&self) -> &str {
        if self.is_placeholder() {
            CAPTION_PLACEHOLDER
        } else {
            &self.caption
        }
    }
}

/// Which face the grid area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridState {
    Loading,
    Empty,
    Cards,
}

#[derive(Debug, Clone, Default)]
pub struct GridView {
    cards: Vec<CardView>,
}

impl GridView {
    pub fn build(photos: &[Photo]) -> Self {
        Self {
            cards: photos.iter().map(CardView::from_photo).collect(),
        }
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&CardView> {
        self.cards.get(index)
    }

    /// Refresh one card's caption; returns false for an unknown index
    pub fn patch_caption(&mut self, index: usize, photo: &Photo) -> bool {
        match self.cards.get_mut(index) {
            Some(card) => {
                card.caption = photo.caption.clone();
                true
            }
            None => false,
        }
    }

    /// Record the outcome of a card's thumbnail generation
    pub fn set_image(&mut self, index: usize, result: Result<PathBuf, String>) {
        if let Some(card) = self.cards.get_mut(index) {
            card.image = match result {
                Ok(path) => CardImage::Ready(path),
                Err(_) => CardImage::Failed,
            };
        }
    }

    pub fn state(&self, loading: bool) -> GridState {
        if loading {
            GridState::Loading
        } else if self.cards.is_empty() {
            GridState::Empty
        } else {
            GridState::Cards
        }
    }

    pub fn view<'a>(&'a self, gallery: &'a GalleryConfig, loading: bool) -> Element<'a, Message> {
        match self.state(loading) {
            GridState::Loading => {
                return container(text("Loading photos...").size(18))
                    .width(Length::Fill)
                    .padding(40)
                    .center_x(Length::Fill)
                    .into();
            }
            GridState::Empty => return empty_state(gallery),
            GridState::Cards => {}
        }

        let cards: Vec<Element<'a, Message>> = self
            .cards
            .iter()
            .enumerate()
            .map(|(index, card)| card_view(index, card))
            .collect();

        Wrap::with_elements(cards)
            .spacing(16.0)
            .line_spacing(16.0)
            .into()
    }
}

fn card_view(index: usize, card: &CardView) -> Element<'_, Message> {
    let picture: Element<'_, Message> = match &card.image {
        CardImage::Ready(path) => image(image::Handle::from_path(path))
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_IMAGE_HEIGHT))
            .content_fit(ContentFit::Cover)
            .into(),
        CardImage::Pending => image_slot(text("...").size(24)),
        CardImage::Failed => image_slot(
            column![text("🖼").size(28), text("Image failed to load").size(14)]
                .spacing(6)
                .align_x(Alignment::Center),
        ),
    };

    let content = column![
        picture,
        text(format!("#{}", card.id)).size(13),
        caption_label(card.caption_text(), card.is_placeholder(), 15),
    ]
    .spacing(8)
    .width(Length::Fixed(CARD_WIDTH));

    button(content)
        .padding(8)
        .style(button::secondary)
        .on_press(Message::OpenPhoto(index))
        .into()
}

fn image_slot<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fixed(CARD_WIDTH))
        .height(Length::Fixed(CARD_IMAGE_HEIGHT))
        .center_x(Length::Fixed(CARD_WIDTH))
        .center_y(Length::Fixed(CARD_IMAGE_HEIGHT))
        .into()
}

/// Caption text; placeholders are italic and dimmed
pub fn caption_label(content: &str, placeholder: bool, size: u16) -> Element<'_, Message> {
    let label = text(content).size(size);
    if placeholder {
        label
            .font(Font {
                style: font::Style::Italic,
                ..Font::DEFAULT
            })
            .color(Color::from_rgba(1.0, 1.0, 1.0, 0.6))
            .into()
    } else {
        label.into()
    }
}

fn empty_state(gallery: &GalleryConfig) -> Element<'_, Message> {
    let folder = format!("{}/", gallery.image_base_path.display());
    let content: Column<Message> = column![
        text("No photos yet").size(24),
        text(format!("Put {} photos into {}", gallery.title.to_lowercase(), folder)).size(16),
        text(format!("Supported formats: {}", SUPPORTED_EXTENSIONS.join(", "))).size(14),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .padding(60)
        .center_x(Length::Fill)
        .into()
}

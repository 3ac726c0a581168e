/// Carousel modal: the single-photo viewer with thumbnail strip and caption editor
use iced::keyboard::{self, key, Key};
use iced::widget::scrollable::{self, RelativeOffset};
use iced::widget::{
    button, center, column, container, image, mouse_area, opaque, row, stack, text, text_input,
    Row,
};
use iced::{
    event, window, Alignment, Color, ContentFit, Element, Event, Length, Padding, Task, Theme,
};

use crate::config::SiteConfig;
use crate::state::session::{Carousel, GallerySession};
use crate::ui::grid::{caption_label, CardImage, GridView};
use crate::ui::swipe;
use crate::Message;

pub const THUMBNAIL_STRIP_ID: &str = "thumbnail-strip";
pub const CAPTION_INPUT_ID: &str = "caption-input";

/// Carousel caption shown when a photo has none
pub const CAPTION_EMPTY: &str = "No caption yet";

const THUMB_SIZE: f32 = 64.0;

/// Horizontal strip offset that brings `cursor` into view
pub fn strip_offset(cursor: usize, len: usize) -> f32 {
    if len <= 1 {
        0.0
    } else {
        cursor as f32 / (len - 1) as f32
    }
}

/// Scroll the thumbnail strip so the current photo is visible
pub fn scroll_to_cursor(cursor: usize, len: usize) -> Task<Message> {
    scrollable::snap_to(
        scrollable::Id::new(THUMBNAIL_STRIP_ID),
        RelativeOffset {
            x: strip_offset(cursor, len),
            y: 0.0,
        },
    )
}

pub fn focus_caption_input() -> Task<Message> {
    text_input::focus(text_input::Id::new(CAPTION_INPUT_ID))
}

/// Listener used while the carousel is open.
///
/// Escape closes even when the caption input captured the key press.
/// Touches feed the swipe tracker.
pub fn modal_events(event: Event, status: event::Status, window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: Key::Named(key::Named::Escape),
            ..
        }) => Some(Message::ClosePhoto),
        event => swipe::touch_events(event, status, window),
    }
}

/// Layer the modal over `base`; a click or tap on the backdrop closes it.
///
/// Touches on the content are captured so they never reach the backdrop.
pub fn overlay<'a>(
    base: impl Into<Element<'a, Message>>,
    content: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    let content = mouse_area(opaque(content)).on_press(Message::ContentTouched);

    stack![
        base.into(),
        opaque(
            mouse_area(center(content).style(|_theme| container::Style {
                background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.9).into()),
                ..container::Style::default()
            }))
            .on_press(Message::ClosePhoto)
        )
    ]
    .into()
}

/// Modal content for an open carousel, `None` while closed
pub fn view<'a>(
    session: &'a GallerySession,
    grid: &'a GridView,
    site: &'a SiteConfig,
) -> Option<Element<'a, Message>> {
    let Carousel::Open { cursor, .. } = session.carousel() else {
        return None;
    };
    let cursor = *cursor;
    let photo = session.current()?;
    let counter = session.counter().unwrap_or_default();

    let failed = matches!(
        grid.card(cursor).map(|card| &card.image),
        Some(CardImage::Failed)
    );
    let picture: Element<'a, Message> = if failed {
        container(text("Image failed to load").size(18))
            .height(Length::Fixed(480.0))
            .center_y(Length::Fixed(480.0))
            .into()
    } else {
        image(image::Handle::from_path(
            site.image_path(session.config(), photo),
        ))
        .height(Length::Fixed(480.0))
        .content_fit(ContentFit::Contain)
        .into()
    };

    let controls = row![
        button("‹ Prev").on_press(Message::PrevPhoto),
        text(counter).size(16),
        button("Next ›").on_press(Message::NextPhoto),
        button("✕").style(button::danger).on_press(Message::ClosePhoto),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    let caption: Element<'a, Message> = match session.draft() {
        None => column![
            caption_label(
                if photo.has_caption() { photo.caption.as_str() } else { CAPTION_EMPTY },
                !photo.has_caption(),
                18,
            ),
            button("Edit caption").on_press(Message::StartEdit),
        ]
        .spacing(10)
        .align_x(Alignment::Center)
        .into(),
        Some(draft) => row![
            text_input("Add a caption...", draft)
                .id(text_input::Id::new(CAPTION_INPUT_ID))
                .on_input(Message::CaptionInput)
                .on_submit(Message::SaveCaption)
                .width(Length::Fixed(360.0)),
            button("Save").style(button::success).on_press(Message::SaveCaption),
            button("Cancel").style(button::secondary).on_press(Message::CancelEdit),
        ]
        .spacing(10)
        .align_y(Alignment::Center)
        .into(),
    };

    let content = column![
        picture,
        controls,
        caption,
        thumbnail_strip(grid, cursor)
    ]
    .spacing(18)
    .padding(24)
    .max_width(900.0)
    .align_x(Alignment::Center);

    Some(content.into())
}

fn thumbnail_strip(grid: &GridView, cursor: usize) -> Element<'_, Message> {
    let thumbs = grid.cards().iter().enumerate().map(|(index, card)| {
        let face: Element<'_, Message> = match &card.image {
            CardImage::Ready(path) => image(image::Handle::from_path(path))
                .width(Length::Fixed(THUMB_SIZE))
                .height(Length::Fixed(THUMB_SIZE))
                .content_fit(ContentFit::Cover)
                .into(),
            _ => container(text(card.id.to_string()).size(14))
                .width(Length::Fixed(THUMB_SIZE))
                .height(Length::Fixed(THUMB_SIZE))
                .center_x(Length::Fixed(THUMB_SIZE))
                .center_y(Length::Fixed(THUMB_SIZE))
                .into(),
        };

        let style: fn(&Theme, button::Status) -> button::Style = if index == cursor {
            button::primary
        } else {
            button::secondary
        };

        button(face)
            .padding(3)
            .style(style)
            .on_press(Message::OpenPhoto(index))
            .into()
    });

    scrollable::Scrollable::new(Row::with_children(thumbs).spacing(8).padding(Padding {
        bottom: 12.0,
        ..Padding::ZERO
    }))
        .id(scrollable::Id::new(THUMBNAIL_STRIP_ID))
        .direction(scrollable::Direction::Horizontal(scrollable::Scrollbar::new()))
        .width(Length::Fill)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::keyboard::key::{Code, Physical};
    use iced::keyboard::{Location, Modifiers};
    use iced::{mouse, touch, Font, Pixels, Point, Size};
    use iced_runtime::core::clipboard;
    use iced_runtime::user_interface::{Cache, UserInterface};

    const WINDOW: Size = Size::new(1000.0, 800.0);
    const BACKDROP: Point = Point::new(20.0, 20.0);
    const CENTER: Point = Point::new(500.0, 400.0);

    fn renderer() -> iced::Renderer {
        iced::Renderer::Secondary(iced_tiny_skia::Renderer::new(Font::DEFAULT, Pixels(16.0)))
    }

    fn escape() -> Event {
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: Key::Named(key::Named::Escape),
            modified_key: Key::Named(key::Named::Escape),
            physical_key: Physical::Code(Code::Escape),
            location: Location::Standard,
            modifiers: Modifiers::empty(),
            text: None,
        })
    }

    fn finger(position: Point) -> Vec<Event> {
        vec![
            Event::Touch(touch::Event::FingerPressed {
                id: touch::Finger(0),
                position,
            }),
            Event::Touch(touch::Event::FingerLifted {
                id: touch::Finger(0),
                position,
            }),
        ]
    }

    /// Feed `events` to a modal holding a single fixed-size block, with the
    /// cursor where the shell would put it
    fn dispatch(events: &[Event], at: Point) -> (Vec<Message>, Vec<event::Status>) {
        let mut renderer = renderer();
        let content = container(text("photo"))
            .width(Length::Fixed(200.0))
            .height(Length::Fixed(200.0));
        let mut ui = UserInterface::build(
            overlay(text("grid"), content),
            WINDOW,
            Cache::default(),
            &mut renderer,
        );

        let mut messages = Vec::new();
        let (_, statuses) = ui.update(
            events,
            mouse::Cursor::Available(at),
            &mut renderer,
            &mut clipboard::Null,
            &mut messages,
        );
        (messages, statuses)
    }

    fn closes(messages: &[Message]) -> bool {
        messages.iter().any(|m| matches!(m, Message::ClosePhoto))
    }

    #[test]
    fn test_strip_offset() {
        assert_eq!(strip_offset(0, 1), 0.0);
        assert_eq!(strip_offset(0, 0), 0.0);
        assert_eq!(strip_offset(0, 5), 0.0);
        assert_eq!(strip_offset(2, 5), 0.5);
        assert_eq!(strip_offset(4, 5), 1.0);
    }

    #[test]
    fn test_escape_closes_even_when_captured() {
        for status in [event::Status::Captured, event::Status::Ignored] {
            let message = modal_events(escape(), status, window::Id::unique());
            assert!(matches!(message, Some(Message::ClosePhoto)));
        }
    }

    #[test]
    fn test_escape_from_focused_caption_input() {
        let mut renderer = renderer();
        let editor = text_input("Add a caption...", "海边")
            .id(text_input::Id::new(CAPTION_INPUT_ID))
            .on_input(Message::CaptionInput)
            .width(Length::Fixed(360.0));
        let mut ui =
            UserInterface::build(overlay(text("grid"), editor), WINDOW, Cache::default(), &mut renderer);

        // Click into the input to focus it, then press Escape
        let mut messages = Vec::new();
        ui.update(
            &[
                Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)),
                Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)),
            ],
            mouse::Cursor::Available(CENTER),
            &mut renderer,
            &mut clipboard::Null,
            &mut messages,
        );
        let (_, statuses) = ui.update(
            &[escape()],
            mouse::Cursor::Available(CENTER),
            &mut renderer,
            &mut clipboard::Null,
            &mut messages,
        );

        assert!(!closes(&messages));
        let message = modal_events(escape(), statuses[0], window::Id::unique());
        assert!(matches!(message, Some(Message::ClosePhoto)));
    }

    #[test]
    fn test_modal_events_forward_touches() {
        let [pressed, lifted]: [Event; 2] = finger(Point::new(300.0, 10.0)).try_into().unwrap();
        let id = window::Id::unique();

        let start = modal_events(pressed, event::Status::Captured, id);
        assert!(matches!(start, Some(Message::SwipeStart(x)) if x == 300.0));
        let end = modal_events(lifted, event::Status::Ignored, id);
        assert!(matches!(end, Some(Message::SwipeEnd(x)) if x == 300.0));
    }

    #[test]
    fn test_backdrop_tap_closes() {
        let (messages, _) = dispatch(&finger(BACKDROP), BACKDROP);
        assert!(closes(&messages));
    }

    #[test]
    fn test_backdrop_click_closes() {
        let press = [Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))];
        let (messages, _) = dispatch(&press, BACKDROP);
        assert!(closes(&messages));
    }

    #[test]
    fn test_touching_the_content_keeps_modal_open() {
        let (messages, statuses) = dispatch(&finger(CENTER), CENTER);
        assert!(!closes(&messages));
        assert_eq!(statuses[0], event::Status::Captured);

        let press = [Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))];
        let (messages, _) = dispatch(&press, CENTER);
        assert!(!closes(&messages));
    }
}

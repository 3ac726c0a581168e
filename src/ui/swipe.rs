use iced::{event, touch, window, Event};

use crate::Message;

/// Minimum horizontal travel (logical pixels) for a touch to count as a swipe
pub const SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved right-to-left
    Next,
    /// Finger moved left-to-right
    Prev,
}

/// Decide whether a touch from `start_x` to `end_x` is a swipe.
/// The travel must be strictly greater than the threshold.
pub fn classify(start_x: f32, end_x: f32) -> Option<Swipe> {
    let diff = start_x - end_x;
    if diff.abs() <= SWIPE_THRESHOLD {
        return None;
    }
    if diff > 0.0 {
        Some(Swipe::Next)
    } else {
        Some(Swipe::Prev)
    }
}

/// Tracks one touch between finger-down and finger-up
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start_x: Option<f32>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    pub fn finish(&mut self, x: f32) -> Option<Swipe> {
        let start_x = self.start_x.take()?;
        classify(start_x, x)
    }

    pub fn cancel(&mut self) {
        self.start_x = None;
    }
}

/// Map finger events to swipe messages
pub fn touch_events(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Touch(touch::Event::FingerPressed { position, .. }) => {
            Some(Message::SwipeStart(position.x))
        }
        Event::Touch(touch::Event::FingerLifted { position, .. }) => {
            Some(Message::SwipeEnd(position.x))
        }
        Event::Touch(touch::Event::FingerLost { .. }) => Some(Message::SwipeCancel),
        _ => None,
    }
}

/// Transient confirmation notice
///
/// Shown fully for two seconds, then faded out over 300 ms and dropped.
use iced::time::{Duration, Instant};
use iced::widget::{container, text};
use iced::{Border, Color, Element, Length};

use crate::Message;

pub const VISIBLE_FOR: Duration = Duration::from_secs(2);
pub const FADE_FOR: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Visible,
    Fading { opacity: f32 },
    Expired,
}

#[derive(Debug, Clone)]
pub struct Toast {
    message: String,
    shown_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self::shown_at(message, Instant::now())
    }

    pub fn shown_at(message: impl Into<String>, shown_at: Instant) -> Self {
        Self {
            message: message.into(),
            shown_at,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn phase(&self, now: Instant) -> Phase {
        let elapsed = now.saturating_duration_since(self.shown_at);
        if elapsed < VISIBLE_FOR {
            return Phase::Visible;
        }

        let fading = elapsed - VISIBLE_FOR;
        if fading < FADE_FOR {
            let opacity = 1.0 - fading.as_secs_f32() / FADE_FOR.as_secs_f32();
            Phase::Fading { opacity }
        } else {
            Phase::Expired
        }
    }

    pub fn view(&self, now: Instant) -> Element<'_, Message> {
        let opacity = match self.phase(now) {
            Phase::Visible => 1.0,
            Phase::Fading { opacity } => opacity,
            Phase::Expired => 0.0,
        };

        let notice = container(
            text(self.message())
                .size(16)
                .color(Color { a: opacity, ..Color::WHITE }),
        )
        .padding([15, 30])
        .style(move |_theme| container::Style {
            background: Some(Color::from_rgba(0.16, 0.45, 0.85, opacity).into()),
            border: Border {
                radius: 8.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        });

        container(notice)
            .width(Length::Fill)
            .padding([100, 0])
            .center_x(Length::Fill)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases() {
        let start = Instant::now();
        let toast = Toast::shown_at("Caption saved!", start);

        assert_eq!(toast.phase(start), Phase::Visible);
        assert_eq!(toast.phase(start + Duration::from_millis(1999)), Phase::Visible);

        match toast.phase(start + Duration::from_millis(2150)) {
            Phase::Fading { opacity } => assert!((opacity - 0.5).abs() < 0.01),
            other => panic!("expected fading, got {other:?}"),
        }

        assert_eq!(toast.phase(start + Duration::from_millis(2300)), Phase::Expired);
        assert_eq!(toast.phase(start + Duration::from_secs(10)), Phase::Expired);
    }

    #[test]
    fn test_clock_before_shown_counts_as_visible() {
        let start = Instant::now() + Duration::from_secs(1);
        let toast = Toast::shown_at("early", start);
        assert_eq!(toast.phase(Instant::now()), Phase::Visible);
        assert_eq!(toast.message(), "early");
    }
}

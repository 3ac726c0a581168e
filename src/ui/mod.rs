/// Gallery widgets
///
/// - `grid.rs` - photo cards with lazily loaded thumbnails
/// - `carousel.rs` - modal viewer, thumbnail strip and caption editor
/// - `swipe.rs` - horizontal swipe detection for touch screens
/// - `toast.rs` - auto-dismissing confirmation notice

pub mod carousel;
pub mod grid;
pub mod swipe;
pub mod toast;

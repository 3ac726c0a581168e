/// Media module
///
/// This module handles:
/// - Loading photo documents (embedded or from the site root)
/// - Generating and caching card thumbnails

pub mod loader;
pub mod thumbnail;

/// State management module
///
/// This module handles all gallery state, including:
/// - Photo records and photo documents (data.rs)
/// - The persisted caption overlay (captions.rs)
/// - Local key/value storage (storage.rs)
/// - The per-gallery carousel and caption editor controller (session.rs)

pub mod captions;
pub mod data;
pub mod session;
pub mod storage;

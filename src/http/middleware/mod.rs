//! Router middleware.

pub mod track;

pub use track::track_requests;

// Presentation layer - Rendered dashboard state and its HTTP surface
pub mod app_state;
pub mod handlers;
pub mod snapshot;

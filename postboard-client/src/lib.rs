//! Client side of postboard: an HTTP client for the posts API, the state behind the
//! post list and its forms, and a plain-text rendering of that state.

pub mod api;
pub mod board;
pub mod commands;
pub mod render;

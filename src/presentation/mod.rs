//! Presentation layer: view models and templates.

pub mod text;
pub mod views;

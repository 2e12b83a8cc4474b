//! Presentation layer: view structs and template rendering.

pub mod views;

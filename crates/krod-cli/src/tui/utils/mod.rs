//! Rendering utilities

pub mod syntax;
pub mod text;

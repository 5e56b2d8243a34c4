//! HTTP handlers for the entity resources.

pub mod entity;
pub use entity::*;

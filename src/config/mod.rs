//! Runtime configuration.

mod settings;

pub use settings::{Settings, StoreKind};

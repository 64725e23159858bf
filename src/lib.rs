pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod store;
pub mod theme;
pub mod utils;

// Re-export commonly used types and traits
pub use crate::error::{BlogError, EntityKind, Result};
pub use crate::models::{Author, Comment, Config, Post, Tag};
pub use crate::store::Store;
pub use crate::theme::renderer::{Renderer, ThemeRenderer};

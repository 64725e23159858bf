pub mod config;
pub mod types;

pub use config::{Config, ListingConfig};
pub use types::{Author, Comment, CommentEntry, Post, PostEntry, Tag, TagEntry};

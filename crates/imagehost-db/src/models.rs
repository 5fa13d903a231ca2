//! Rust models matching the database schema.

use imagehost_common::ImageId;
use serde::{Deserialize, Serialize};

/// Stored image record.
///
/// `width` and `height` are the pixel dimensions of the file on disk, and
/// `path` is that file's location relative to the media root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    pub id: ImageId,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub path: String,
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Image \"{}\", {}x{}", self.title, self.width, self.height)
    }
}

/// Fields of an image record before the database assigns its ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub path: String,
}

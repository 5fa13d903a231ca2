//! Image preparation and storage.
//!
//! [`prepare_image`] turns an upload into the bytes that will be stored,
//! resizing when asked. [`ImageService`] is the [`ImageStore`] that writes
//! those bytes under the media root and records them in the database.

mod prepare;
mod service;
mod storage;
mod store;

pub use prepare::{
    file_extension, format_for_extension, prepare_image, target_size, PrepareError,
    PreparedImage,
};
pub use service::ImageService;
pub use storage::{valid_filename, MediaStorage};
pub use store::ImageStore;

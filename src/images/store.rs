//! Repository interface for image records and their files.

use imagehost_common::{ImageId, Result};
use imagehost_db::models::Image;

/// Persistence for uploaded images: metadata plus the stored binary.
///
/// Implementations own filename-collision handling; `save` must never
/// overwrite an existing stored file.
pub trait ImageStore: Send + Sync {
    /// Store `data` under a name derived from `filename` and record it.
    fn save(
        &self,
        title: &str,
        width: u32,
        height: u32,
        data: &[u8],
        filename: &str,
    ) -> Result<Image>;

    /// Fetch a record by ID, failing with `Error::NotFound` if absent.
    fn get(&self, id: ImageId) -> Result<Image>;

    /// All records in ID order, optionally filtered by a case-insensitive
    /// title substring.
    fn list(&self, title_contains: Option<&str>) -> Result<Vec<Image>>;
}

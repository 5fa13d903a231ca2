//! Image service coordinating file storage and database records.

use imagehost_common::{Error, ImageId, Result};
use imagehost_db::models::{Image, NewImage};
use imagehost_db::pool::{get_conn, DbPool};
use imagehost_db::queries::images;

use super::storage::MediaStorage;
use super::store::ImageStore;

/// [`ImageStore`] backed by a [`MediaStorage`] directory and SQLite.
pub struct ImageService {
    storage: MediaStorage,
    pool: DbPool,
}

impl ImageService {
    /// Create a new `ImageService`.
    ///
    /// # Arguments
    ///
    /// * `storage` - The filesystem image storage backend
    /// * `pool` - Database connection pool
    pub fn new(storage: MediaStorage, pool: DbPool) -> Self {
        Self { storage, pool }
    }

    #[cfg(test)]
    fn storage(&self) -> &MediaStorage {
        &self.storage
    }
}

impl ImageStore for ImageService {
    /// Write the file first, then the record. If the insert fails the file is
    /// removed again so no orphan is left behind.
    fn save(
        &self,
        title: &str,
        width: u32,
        height: u32,
        data: &[u8],
        filename: &str,
    ) -> Result<Image> {
        let path = self.storage.store(filename, data)?;

        let record = NewImage {
            title: title.to_string(),
            width,
            height,
            path,
        };

        let inserted = get_conn(&self.pool).and_then(|conn| images::insert_image(&conn, &record));

        match inserted {
            Ok(image) => Ok(image),
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&record.path) {
                    tracing::warn!(
                        "Failed to remove {} after insert error: {}",
                        record.path,
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    fn get(&self, id: ImageId) -> Result<Image> {
        let conn = get_conn(&self.pool)?;
        images::get_image(&conn, id)?.ok_or_else(|| Error::not_found(format!("image {}", id)))
    }

    fn list(&self, title_contains: Option<&str>) -> Result<Vec<Image>> {
        let conn = get_conn(&self.pool)?;
        images::list_images(&conn, title_contains)
    }
}

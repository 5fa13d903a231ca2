//! Image database queries.
//!
//! Records are append-only: there is an insert, a lookup by ID, and a listing
//! with an optional case-insensitive title filter.

use imagehost_common::{Error, ImageId, Result};
use rusqlite::Connection;

use crate::models::{Image, NewImage};

/// Parse an image from a database row.
///
/// Expects columns in order: id, title, width, height, path.
fn parse_image_row(row: &rusqlite::Row) -> rusqlite::Result<Image> {
    Ok(Image {
        id: ImageId::from(row.get::<_, i64>(0)?),
        title: row.get(1)?,
        width: row.get(2)?,
        height: row.get(3)?,
        path: row.get(4)?,
    })
}

/// Insert a new image record.
///
/// # Returns
///
/// * `Ok(Image)` - The stored record with its assigned ID
/// * `Err(Error)` - If a database error occurs
pub fn insert_image(conn: &Connection, image: &NewImage) -> Result<Image> {
    conn.execute(
        "INSERT INTO images (title, width, height, path)
         VALUES (:title, :width, :height, :path)",
        rusqlite::named_params! {
            ":title": &image.title,
            ":width": image.width,
            ":height": image.height,
            ":path": &image.path,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Image {
        id: ImageId::from(conn.last_insert_rowid()),
        title: image.title.clone(),
        width: image.width,
        height: image.height,
        path: image.path.clone(),
    })
}

/// Get an image by ID.
///
/// # Returns
///
/// * `Ok(Some(Image))` - The image if found
/// * `Ok(None)` - If the image does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_image(conn: &Connection, id: ImageId) -> Result<Option<Image>> {
    let result = conn.query_row(
        "SELECT id, title, width, height, path FROM images WHERE id = :id",
        rusqlite::named_params! { ":id": id.get() },
        parse_image_row,
    );

    match result {
        Ok(image) => Ok(Some(image)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List images in ID order, optionally keeping only those whose title
/// contains `title_contains` (case-insensitive).
///
/// SQLite's `LIKE` only folds ASCII case, so the filter runs on the Rust side
/// with full Unicode lowercasing.
pub fn list_images(conn: &Connection, title_contains: Option<&str>) -> Result<Vec<Image>> {
    let mut stmt = conn
        .prepare("SELECT id, title, width, height, path FROM images ORDER BY id")
        .map_err(|e| Error::database(e.to_string()))?;

    let images = stmt
        .query_map([], parse_image_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let Some(needle) = title_contains else {
        return Ok(images);
    };
    let needle = needle.to_lowercase();

    Ok(images
        .into_iter()
        .filter(|image| image.title.to_lowercase().contains(&needle))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};

    fn new_image(title: &str, path: &str) -> NewImage {
        NewImage {
            title: title.to_string(),
            width: 100,
            height: 50,
            path: path.to_string(),
        }
    }

    #[test]
    fn test_insert_and_get_image() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let inserted = insert_image(&conn, &new_image("example", "images/example.png")).unwrap();
        assert!(inserted.id.get() > 0);

        let fetched = get_image(&conn, inserted.id).unwrap().unwrap();
        assert_eq!(fetched, inserted);
    }

    #[test]
    fn test_get_missing_image() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        assert!(get_image(&conn, ImageId::from(999)).unwrap().is_none());
    }

    #[test]
    fn test_ids_are_distinct() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let a = insert_image(&conn, &new_image("a", "images/a.png")).unwrap();
        let b = insert_image(&conn, &new_image("b", "images/b.png")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(list_images(&conn, None).unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        insert_image(&conn, &new_image("a", "images/a.png")).unwrap();
        let err = insert_image(&conn, &new_image("b", "images/a.png")).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_list_images_in_id_order() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        for (title, path) in [("one", "images/1.png"), ("two", "images/2.png"), ("three", "images/3.png")] {
            insert_image(&conn, &new_image(title, path)).unwrap();
        }

        let titles: Vec<_> = list_images(&conn, None)
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_list_images_title_filter_is_case_insensitive() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        for (title, path) in [
            ("example", "images/example.png"),
            ("another", "images/another.gif"),
            ("hello?", "images/hello.jpg"),
            ("Testing", "images/testing.tiff"),
            ("New one", "images/new_one.webp"),
        ] {
            insert_image(&conn, &new_image(title, path)).unwrap();
        }

        assert_eq!(list_images(&conn, Some("a")).unwrap().len(), 2);
        assert_eq!(list_images(&conn, Some("e")).unwrap().len(), 5);
        assert_eq!(list_images(&conn, Some("E")).unwrap().len(), 5);
        assert_eq!(list_images(&conn, Some("testing")).unwrap().len(), 1);
        assert_eq!(list_images(&conn, Some("Non-existing")).unwrap().len(), 0);
        assert_eq!(list_images(&conn, Some("")).unwrap().len(), 5);
    }

    #[test]
    fn test_list_images_unicode_case_folding() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        insert_image(&conn, &new_image("Łódź", "images/lodz.png")).unwrap();
        assert_eq!(list_images(&conn, Some("łó")).unwrap().len(), 1);
    }
}

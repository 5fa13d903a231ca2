//! Imagehost-DB: Database schema, migrations, and query operations
//!
//! Image metadata lives in SQLite, accessed through rusqlite with r2d2
//! connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use imagehost_db::models::NewImage;
//! use imagehost_db::pool::{get_conn, init_pool};
//! use imagehost_db::queries::images;
//!
//! let pool = init_pool("/var/lib/imagehost/imagehost.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let image = images::insert_image(
//!     &conn,
//!     &NewImage {
//!         title: "example".into(),
//!         width: 300,
//!         height: 200,
//!         path: "images/example.png".into(),
//!     },
//! )
//! .unwrap();
//! println!("Stored {}", image);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;

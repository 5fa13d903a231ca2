//! Imagehost-Common: Shared types and error handling.
//!
//! - **Typed IDs**: [`ImageId`], the database identifier of a stored image
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use imagehost_common::{Error, ImageId, Result};
//!
//! fn lookup(id: ImageId) -> Result<()> {
//!     Err(Error::not_found(format!("image {}", id)))
//! }
//!
//! assert!(lookup(ImageId::from(7)).is_err());
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;

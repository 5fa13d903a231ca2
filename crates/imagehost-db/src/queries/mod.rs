//! Database query modules.
//!
//! - images: Image record insert, lookup, and title search

pub mod images;

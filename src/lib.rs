//! Bookshelf application library
//!
//! Application modules mounted by the HTTP layer.

pub mod modules;

pub use modules::*;

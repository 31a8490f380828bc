//! # Chef Common Library
//!
//! Shared code for the chef console worker:
//! - Error type and bootstrap configuration
//! - Database initialization and the `configuration` settings table
//! - Menu and order records with their list queries
//! - The order notification queue and its message body codec

pub mod codec;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};

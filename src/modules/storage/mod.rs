//! Storage module for file management
//!
//! Provides local filesystem storage for uploaded pet photos and the
//! URLs they are served from.

mod local_storage;

pub use local_storage::LocalStorage;

//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for infrastructure outside the request handlers, such as media storage.

pub mod storage;

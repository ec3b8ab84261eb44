//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for the upload directory and the geocoding service.

pub mod geocoding;
pub mod storage;

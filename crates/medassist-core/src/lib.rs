//! medassist-core
//!
//! Pure domain types, context windowing, query assembly and S3 key
//! conventions shared by every other MedAssist crate. Nothing here talks to
//! AWS or the network.

pub mod context;
pub mod error;
pub mod models;
pub mod query;
pub mod s3_keys;

//! medassist-storage
//!
//! S3 persistence for conversations, uploaded media and medication records.
//! Every entity is one JSON document; writes that extend an existing
//! document are guarded by ETag preconditions.

pub mod client;
pub mod conversations;
pub mod documents;
pub mod error;
pub mod medications;
pub mod objects;

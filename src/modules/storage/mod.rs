//! Storage module for evidence files
//!
//! Evidence is written to a server-controlled directory under generated
//! names and served back read-only at `/uploads`.

mod local_storage;

pub use local_storage::{
    EvidenceStorage, LocalEvidenceStorage, StorageError, StoredObject, PUBLIC_PREFIX,
};

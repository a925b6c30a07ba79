//! # Domain Layer
//!
//! Pure domain logic for the chain store.
//!
//! ## Modules
//!
//! - `entities` - Stored records (StoredBlock, StorageMetadata)
//! - `value_objects` - Key layout, existing-data policy, progress callback
//! - `errors` - Domain error types
//! - `identity` - Genesis identity derivation

pub mod entities;
pub mod errors;
pub mod identity;
pub mod value_objects;

//! # Arca Core
//!
//! The on-disk substrate of a version-control system: repository
//! discovery/initialization and a content-addressed store of immutable
//! typed objects (blobs, trees, commits, tags), addressed by the BLAKE3
//! hash of their serialized contents.
//!
//! A repository is a working tree plus a private `.arca` metadata
//! directory holding the configuration, references, and loose object
//! store. Objects are written once, compressed, and retrievable forever by
//! hash; the store never updates or deletes them.
//!
//! ## Example
//!
//! ```no_run
//! use arca_core::{Object, Repository};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a fresh repository
//! let repo = Repository::create("./project")?;
//!
//! // Store a blob, addressed by its content
//! let hash = repo.write_object(&Object::blob(b"hello".to_vec()))?;
//!
//! // Read it back by hash, from anywhere inside the working tree
//! let repo = Repository::discover("./project/src", true)?.expect("required");
//! let object = repo.read_object(&hash)?.expect("stored above");
//! assert_eq!(object.serialize(), b"hello");
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod hash;
mod object;
mod repo;
mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use hash::Hash;
pub use object::{Blob, Commit, Object, ObjectKind, Tag, Tree};
pub use repo::{METADATA_DIR, Repository};

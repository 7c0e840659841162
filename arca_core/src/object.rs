//! Typed objects and their (de)serialization contracts.
//!
//! The store knows four kinds of object. Each kind owns its own canonical
//! encoding behind the same two-operation contract: `serialize` produces
//! the payload bytes, `deserialize` is its exact inverse. The codec in
//! [`crate::store`] dispatches on [`ObjectKind`] and never looks inside a
//! payload.

use crate::error::{Error, Result};
use std::fmt;

/// The closed set of object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Raw file content.
    Blob,
    /// A directory listing.
    Tree,
    /// Snapshot metadata.
    Commit,
    /// A named pointer with metadata.
    Tag,
}

impl ObjectKind {
    /// The lowercase name used in object headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }

    /// Parse a kind from its header name.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "tag" => Ok(Self::Tag),
            _ => Err(Error::unknown_object_type(s)),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw file content. The payload is opaque to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            data: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// A directory listing. The entry grammar belongs to this type; the bytes
/// are currently carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    data: Vec<u8>,
}

impl Tree {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            data: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Snapshot metadata. Carries its payload verbatim; the key/value grammar
/// belongs to this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    data: Vec<u8>,
}

impl Commit {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            data: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// A named pointer with metadata, same payload contract as [`Commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    data: Vec<u8>,
}

impl Tag {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            data: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// A stored object: one of the four kinds, tagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// Convenience constructor for blob content.
    pub fn blob(data: impl Into<Vec<u8>>) -> Self {
        Object::Blob(Blob::new(data))
    }

    /// The kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tree(_) => ObjectKind::Tree,
            Object::Commit(_) => ObjectKind::Commit,
            Object::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Produce the canonical payload encoding of this object.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Object::Blob(blob) => blob.serialize(),
            Object::Tree(tree) => tree.serialize(),
            Object::Commit(commit) => commit.serialize(),
            Object::Tag(tag) => tag.serialize(),
        }
    }

    /// Reconstruct an object of the given kind from stored payload bytes.
    pub fn deserialize(kind: ObjectKind, bytes: &[u8]) -> Result<Self> {
        match kind {
            ObjectKind::Blob => Blob::deserialize(bytes).map(Object::Blob),
            ObjectKind::Tree => Tree::deserialize(bytes).map(Object::Tree),
            ObjectKind::Commit => Commit::deserialize(bytes).map(Object::Commit),
            ObjectKind::Tag => Tag::deserialize(bytes).map(Object::Tag),
        }
    }
}

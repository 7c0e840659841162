//! Loose object storage.
//!
//! On disk an object is the byte string `"<kind> <decimal-len>\0<payload>"`,
//! zstd-compressed as a whole. The content hash is BLAKE3 over the
//! uncompressed header+payload bytes and doubles as the storage path:
//! `objects/<first two hex chars>/<remaining 62>` under the metadata
//! directory.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{Object, ObjectKind};
use crate::repo::Repository;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

impl Repository {
    /// The path a loose object with this hash occupies.
    pub fn object_path(&self, hash: &Hash) -> PathBuf {
        let prefix = hash.prefix();
        let suffix = hash.suffix();
        self.path(&["objects", prefix.as_str(), suffix.as_str()])
    }

    /// Store an object, returning its content hash.
    ///
    /// Idempotent: when the derived path is already occupied the existing
    /// bytes are trusted and nothing is rewritten. Content addressing makes
    /// divergent bytes under the same hash a cryptographic impossibility,
    /// so no byte comparison is performed.
    pub fn write_object(&self, object: &Object) -> Result<Hash> {
        let raw = encode_envelope(object);
        let hash = Hash::hash_bytes(&raw);
        let obj_path = self.object_path(&hash);
        if obj_path.exists() {
            return Ok(hash);
        }

        let compressed = compress_zstd(&raw)?;

        if let Some(parent) = obj_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically using tempfile
        let temp_dir = obj_path.parent().unwrap_or(self.store_dir());
        let mut temp_file = tempfile::NamedTempFile::new_in(temp_dir)?;
        temp_file.write_all(&compressed)?;
        temp_file.flush()?;
        temp_file.persist(&obj_path)?;

        Ok(hash)
    }

    /// Retrieve an object by hash.
    ///
    /// `Ok(None)` when no object with this hash is stored. The decompressed
    /// header is validated: the declared decimal length must equal the
    /// actual payload length, and the kind name must belong to the closed
    /// set.
    pub fn read_object(&self, hash: &Hash) -> Result<Option<Object>> {
        let obj_path = self.object_path(hash);
        if !obj_path.exists() {
            return Ok(None);
        }

        let compressed = fs::read(&obj_path)?;
        let raw = decompress_zstd(&compressed)?;

        let (kind, payload) = parse_envelope(&raw, &obj_path)?;
        Object::deserialize(kind, payload).map(Some)
    }
}

impl Object {
    /// The content hash this object is (or would be) stored under.
    ///
    /// Deterministic over the kind and the exact payload bytes; no
    /// filesystem involvement.
    pub fn content_hash(&self) -> Hash {
        Hash::hash_bytes(&encode_envelope(self))
    }
}

/// Build the uncompressed envelope `"<kind> <decimal-len>\0<payload>"`.
fn encode_envelope(object: &Object) -> Vec<u8> {
    let payload = object.serialize();

    let mut raw = Vec::with_capacity(payload.len() + 16);
    raw.extend_from_slice(object.kind().as_str().as_bytes());
    raw.push(b' ');
    raw.extend_from_slice(payload.len().to_string().as_bytes());
    raw.push(0);
    raw.extend_from_slice(&payload);
    raw
}

/// Split a decompressed envelope into its kind and payload, validating the
/// declared length.
fn parse_envelope<'a>(raw: &'a [u8], obj_path: &Path) -> Result<(ObjectKind, &'a [u8])> {
    let space = raw
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::malformed_object(obj_path, "no space after object kind"))?;
    let kind_name = std::str::from_utf8(&raw[..space])
        .map_err(|_| Error::malformed_object(obj_path, "object kind is not UTF-8"))?;

    let nul = raw[space + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| i + space + 1)
        .ok_or_else(|| Error::malformed_object(obj_path, "no NUL after declared length"))?;
    let declared: usize = std::str::from_utf8(&raw[space + 1..nul])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            Error::malformed_object(obj_path, "declared length is not a decimal integer")
        })?;

    let payload = &raw[nul + 1..];
    if payload.len() != declared {
        return Err(Error::malformed_object(
            obj_path,
            format!(
                "declared length {} but payload has {} bytes",
                declared,
                payload.len()
            ),
        ));
    }

    let kind = ObjectKind::parse(kind_name)?;
    Ok((kind, payload))
}

/// Compress an envelope using zstd.
fn compress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    zstd::encode_all(data, 3) // Level 3 = fast compression
        .map_err(|e| Error::compression_error(format!("zstd compression failed: {}", e)))
}

/// Decompress an envelope using zstd.
fn decompress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(data)
        .map_err(|e| Error::compression_error(format!("zstd decompression failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Blob, Commit, Tag, Tree};
    use tempfile::TempDir;

    fn test_repo(temp_dir: &TempDir) -> Repository {
        Repository::create(temp_dir.path().join("repo")).unwrap()
    }

    /// Write raw envelope bytes at their derived path, bypassing the codec.
    fn plant_envelope(repo: &Repository, raw: &[u8]) -> Hash {
        let hash = Hash::hash_bytes(raw);
        let obj_path = repo.object_path(&hash);
        fs::create_dir_all(obj_path.parent().unwrap()).unwrap();
        fs::write(&obj_path, compress_zstd(raw).unwrap()).unwrap();
        hash
    }

    #[test]
    fn test_write_read_blob() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = repo.write_object(&Object::blob(b"hello".to_vec())).unwrap();
        assert_eq!(hash.to_hex().len(), 64);

        let read = repo.read_object(&hash).unwrap().unwrap();
        assert_eq!(read.kind(), ObjectKind::Blob);
        match read {
            Object::Blob(blob) => assert_eq!(blob.as_bytes(), b"hello"),
            other => panic!("expected blob, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_write_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let object = Object::blob(b"same content".to_vec());
        let hash1 = repo.write_object(&object).unwrap();
        let hash2 = repo.write_object(&object).unwrap();
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_depends_only_on_kind_and_bytes() {
        let temp_dir1 = TempDir::new().unwrap();
        let temp_dir2 = TempDir::new().unwrap();
        let repo1 = test_repo(&temp_dir1);
        let repo2 = test_repo(&temp_dir2);

        let object = Object::blob(b"stable".to_vec());
        assert_eq!(
            repo1.write_object(&object).unwrap(),
            repo2.write_object(&object).unwrap()
        );
    }

    #[test]
    fn test_same_payload_different_kind_different_hash() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let blob_hash = repo.write_object(&Object::blob(b"x".to_vec())).unwrap();
        let tree_hash = repo
            .write_object(&Object::Tree(Tree::new(b"x".to_vec())))
            .unwrap();
        assert_ne!(blob_hash, tree_hash);
    }

    #[test]
    fn test_read_absent_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = Hash::hash_bytes(b"never stored");
        assert!(repo.read_object(&hash).unwrap().is_none());
    }

    #[test]
    fn test_object_path_sharding() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = repo.write_object(&Object::blob(b"shard me".to_vec())).unwrap();
        let path = repo.object_path(&hash);

        assert!(path.exists());
        assert!(path.ends_with(format!("objects/{}/{}", hash.prefix(), hash.suffix())));
    }

    #[test]
    fn test_all_kinds_roundtrip_kind_and_length() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let objects = [
            Object::Blob(Blob::new(b"blob bytes".to_vec())),
            Object::Tree(Tree::new(b"tree bytes".to_vec())),
            Object::Commit(Commit::new(b"commit bytes".to_vec())),
            Object::Tag(Tag::new(b"tag bytes".to_vec())),
        ];

        for object in objects {
            let hash = repo.write_object(&object).unwrap();
            let read = repo.read_object(&hash).unwrap().unwrap();
            assert_eq!(read.kind(), object.kind());
            assert_eq!(read.serialize(), object.serialize());
        }
    }

    #[test]
    fn test_declared_length_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        // Header claims 10 bytes, only 5 follow
        let hash = plant_envelope(&repo, b"blob 10\0hello");
        assert!(matches!(
            repo.read_object(&hash),
            Err(Error::MalformedObject { .. })
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = plant_envelope(&repo, b"wibble 3\0abc");
        assert!(matches!(
            repo.read_object(&hash),
            Err(Error::UnknownObjectType { .. })
        ));
    }

    #[test]
    fn test_header_without_nul() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = plant_envelope(&repo, b"blob 5hello");
        assert!(matches!(
            repo.read_object(&hash),
            Err(Error::MalformedObject { .. })
        ));
    }

    #[test]
    fn test_header_without_space() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = plant_envelope(&repo, b"blob5\0hello");
        assert!(matches!(
            repo.read_object(&hash),
            Err(Error::MalformedObject { .. })
        ));
    }

    #[test]
    fn test_non_decimal_length() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = plant_envelope(&repo, b"blob five\0hello");
        assert!(matches!(
            repo.read_object(&hash),
            Err(Error::MalformedObject { .. })
        ));
    }

    #[test]
    fn test_stored_file_is_compressed_envelope() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = repo.write_object(&Object::blob(b"hello".to_vec())).unwrap();
        let on_disk = fs::read(repo.object_path(&hash)).unwrap();

        assert_eq!(decompress_zstd(&on_disk).unwrap(), b"blob 5\0hello");
        // The hash covers the uncompressed envelope
        assert_eq!(Hash::hash_bytes(b"blob 5\0hello"), hash);
    }

    #[test]
    fn test_content_hash_matches_write() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let object = Object::blob(b"precomputed".to_vec());
        let precomputed = object.content_hash();
        assert_eq!(repo.write_object(&object).unwrap(), precomputed);
    }

    #[test]
    fn test_empty_payload() {
        let temp_dir = TempDir::new().unwrap();
        let repo = test_repo(&temp_dir);

        let hash = repo.write_object(&Object::blob(Vec::new())).unwrap();
        let read = repo.read_object(&hash).unwrap().unwrap();
        assert_eq!(read.serialize(), Vec::<u8>::new());
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            max_shrink_iters: 1000,
            ..ProptestConfig::default()
        })]

        /// Store round-trip: any payload written as any kind reads back with
        /// the same kind and bytes, under the same hash.
        #[test]
        fn prop_store_roundtrip(
            payload in prop::collection::vec(any::<u8>(), 0..10_000),
        ) {
            let temp_dir = TempDir::new().unwrap();
            let repo = test_repo(&temp_dir);

            let object = Object::blob(payload.clone());
            let hash = repo.write_object(&object)?;
            let read = repo.read_object(&hash)?.expect("just written");
            prop_assert_eq!(read.kind(), ObjectKind::Blob);
            prop_assert_eq!(read.serialize(), payload);
        }
    }
}

//! Binary content storage
//!
//! NonRDFSource content is stored content-addressed by its BLAKE3 hash:
//! `{root}/{hex[0..2]}/{hex[2..4]}/{hex}.bin`. Identical content is stored once.

use crate::error::{LdpError, StorageError};
use crate::rdf::Iri;
use crate::resource::BinaryMetadata;
use std::fs;
use std::path::{Path, PathBuf};

const LOCATION_PREFIX: &str = "urn:blake3:";
const DIGEST_ALGORITHM: &str = "blake3";

/// Content-addressed blob storage
pub struct BinaryStore {
    root: PathBuf,
}

impl BinaryStore {
    /// Create a new BinaryStore at `root`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            StorageError::backend(&format!("create binary directory at {:?}", root), e)
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `content`, returning metadata for the NonRDFSource that describes it.
    ///
    /// Writes go to a `.tmp` file first and are renamed into place.
    pub fn store(&self, content: &[u8], mime_type: Option<String>) -> Result<BinaryMetadata, StorageError> {
        let hex = blake3::hash(content).to_hex().to_string();
        let path = self.blob_path(&hex)?;

        if !path.exists() {
            let temp_path = path.with_extension("bin.tmp");
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::backend(&format!("create parent directory {:?}", parent), e)
                })?;
            }
            fs::write(&temp_path, content).map_err(|e| {
                StorageError::backend(&format!("write binary to {:?}", temp_path), e)
            })?;
            fs::rename(&temp_path, &path).map_err(|e| {
                let _ = fs::remove_file(&temp_path);
                StorageError::backend(&format!("rename temp file to {:?}", path), e)
            })?;
        }

        Ok(BinaryMetadata {
            location: Iri::new(format!("{}{}", LOCATION_PREFIX, hex)),
            mime_type,
            size: content.len() as u64,
            digest: format!("{}={}", DIGEST_ALGORITHM, hex),
        })
    }

    /// Content at `location`, verified against its hash. `None` if absent.
    pub fn get(&self, location: &Iri) -> Result<Option<Vec<u8>>, StorageError> {
        let hex = location
            .as_str()
            .strip_prefix(LOCATION_PREFIX)
            .ok_or_else(|| StorageError::InvalidPath(location.to_string()))?;
        let path = self.blob_path(hex)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read(&path)
            .map_err(|e| StorageError::backend(&format!("read binary from {:?}", path), e))?;
        let actual = blake3::hash(&content).to_hex().to_string();
        if actual != hex {
            return Err(StorageError::HashMismatch {
                expected: hex.to_string(),
                actual,
            });
        }
        Ok(Some(content))
    }

    pub fn exists(&self, location: &Iri) -> Result<bool, StorageError> {
        match location.as_str().strip_prefix(LOCATION_PREFIX) {
            Some(hex) => Ok(self.blob_path(hex)?.exists()),
            None => Err(StorageError::InvalidPath(location.to_string())),
        }
    }

    /// Path structure: `{root}/{hex[0..2]}/{hex[2..4]}/{hex}.bin`
    fn blob_path(&self, hex: &str) -> Result<PathBuf, StorageError> {
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidPath(hex.to_string()));
        }
        Ok(self
            .root
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(format!("{}.bin", hex)))
    }
}

/// Check a client-supplied `algorithm=value` digest against `content`.
///
/// Only `blake3` (hex encoded) is supported.
pub fn verify_digest(content: &[u8], digest: &str) -> Result<(), LdpError> {
    let (algorithm, expected) = digest
        .split_once('=')
        .ok_or_else(|| LdpError::MalformedInput(format!("Malformed digest: {}", digest)))?;
    if !algorithm.eq_ignore_ascii_case(DIGEST_ALGORITHM) {
        return Err(LdpError::MalformedInput(format!(
            "Unsupported digest algorithm: {}",
            algorithm
        )));
    }
    let expected = hex::decode(expected)
        .map_err(|e| LdpError::MalformedInput(format!("Malformed digest value: {}", e)))?;
    let actual = blake3::hash(content);
    if expected.as_slice() != actual.as_bytes() {
        return Err(LdpError::MalformedInput(format!(
            "Digest mismatch: expected {}, got {}",
            hex::encode(&expected),
            actual.to_hex()
        )));
    }
    Ok(())
}

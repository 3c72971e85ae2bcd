//! File-backed memento storage
//!
//! Each identifier gets its own directory, addressed by the BLAKE3 hash of the
//! identifier: `{root}/{hex[0..2]}/{hex[2..4]}/{hex}/`. Every memento inside is
//! one bincode file named `{seconds}-{nanos}.memento`, so listing a directory
//! yields the identifier's history.

use crate::error::StorageError;
use crate::memento::{select_memento, MementoStore};
use crate::rdf::Iri;
use crate::resource::Resource;
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "memento";

/// Filesystem MementoStore
pub struct FileMementoStore {
    root: PathBuf,
}

impl FileMementoStore {
    /// Use `root` as the memento directory. Nothing is created until the first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the history of `id`
    fn resource_dir(&self, id: &Iri) -> PathBuf {
        let hex = blake3::hash(id.as_str().as_bytes()).to_hex();
        self.root.join(&hex[0..2]).join(&hex[2..4]).join(hex.as_str())
    }

    fn memento_path(&self, id: &Iri, time: DateTime<Utc>) -> PathBuf {
        self.resource_dir(id).join(file_name(time))
    }
}

fn file_name(time: DateTime<Utc>) -> String {
    format!(
        "{:020}-{:09}.{}",
        time.timestamp(),
        time.timestamp_subsec_nanos(),
        EXTENSION
    )
}

fn parse_file_name(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(EXTENSION)?.strip_suffix('.')?;
    let (secs, nanos) = stem.rsplit_once('-')?;
    let secs: i64 = secs.parse().ok()?;
    let nanos: u32 = nanos.parse().ok()?;
    Utc.timestamp_opt(secs, nanos).single()
}

impl MementoStore for FileMementoStore {
    fn put(&self, id: &Iri, time: DateTime<Utc>, resource: &Resource) -> Result<(), StorageError> {
        let path = self.memento_path(id, time);
        let temp_path = path.with_extension("memento.tmp");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::backend(&format!("create memento directory {:?}", parent), e)
            })?;
        }

        let serialized =
            bincode::serialize(resource).map_err(|e| StorageError::codec("serialize memento", e))?;

        fs::write(&temp_path, &serialized)
            .map_err(|e| StorageError::backend(&format!("write memento to {:?}", temp_path), e))?;

        fs::rename(&temp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::backend(&format!("rename memento to {:?}", path), e)
        })?;

        Ok(())
    }

    fn list(&self, id: &Iri) -> Result<Vec<DateTime<Utc>>, StorageError> {
        let dir = self.resource_dir(id);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::backend(
                    &format!("list mementos in {:?}", dir),
                    e,
                ))
            }
        };

        let mut times = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| StorageError::backend(&format!("list mementos in {:?}", dir), e))?;
            if let Some(time) = entry.file_name().to_str().and_then(parse_file_name) {
                times.push(time);
            }
        }
        times.sort();
        Ok(times)
    }

    fn get(&self, id: &Iri, time: DateTime<Utc>) -> Result<Option<Resource>, StorageError> {
        let times = self.list(id)?;
        let Some(selected) = select_memento(&times, time) else {
            return Ok(None);
        };

        let path = self.memento_path(id, selected);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            // Deleted between listing and reading.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::backend(
                    &format!("read memento from {:?}", path),
                    e,
                ))
            }
        };

        let resource: Resource = bincode::deserialize(&bytes)
            .map_err(|e| StorageError::codec(&format!("deserialize memento from {:?}", path), e))?;
        if resource.identifier != *id {
            return Err(StorageError::HashMismatch {
                expected: id.to_string(),
                actual: resource.identifier.to_string(),
            });
        }
        Ok(Some(resource))
    }

    fn delete(&self, id: &Iri, time: DateTime<Utc>) -> Result<bool, StorageError> {
        let path = self.memento_path(id, time);
        match fs::remove_file(&path) {
            Ok(()) => {
                // Drop the directory once the history is empty; fails harmlessly otherwise.
                let _ = fs::remove_dir(self.resource_dir(id));
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::backend(
                &format!("delete memento {:?}", path),
                e,
            )),
        }
    }
}

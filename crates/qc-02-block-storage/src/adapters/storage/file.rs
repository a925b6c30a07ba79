use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::memory::{apply_batch, scan};

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

/// File-backed key-value store.
///
/// The whole map lives in memory and is rewritten to disk after every
/// mutation, via a temp file and rename, so a crash leaves either the old
/// or the new contents on disk.
///
/// Format: `[key_len:u32 LE][key][value_len:u32 LE][value]...`
#[derive(Debug)]
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open the store at `path`, loading existing contents if the file
    /// exists. A missing file yields an empty store; nothing is written
    /// until the first mutation.
    ///
    /// # Errors
    ///
    /// `CorruptionError` if the file is truncated mid-record.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let data = match std::fs::File::open(&path) {
            Ok(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes).map_err(io_error)?;
                tracing::info!(
                    "[qc-02] 💾 Found existing storage file: {} ({} bytes)",
                    path.display(),
                    bytes.len()
                );
                Self::decode(&bytes)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("[qc-02] 📁 No existing storage file at {}", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(io_error(e)),
        };

        if !data.is_empty() {
            tracing::info!("[qc-02] 💾 Loaded {} keys from {}", data.len(), path.display());
        }

        Ok(Self { data, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(bytes: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
        let mut data = BTreeMap::new();
        let mut cursor = 0;

        while cursor < bytes.len() {
            let key = Self::read_chunk(bytes, &mut cursor)?;
            let value = Self::read_chunk(bytes, &mut cursor)?;
            data.insert(key, value);
        }

        Ok(data)
    }

    fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
        let truncated = |at: usize| KVStoreError::CorruptionError {
            message: format!("storage file truncated at byte {}", at),
        };

        let len_end = *cursor + 4;
        let len_bytes: [u8; 4] = bytes
            .get(*cursor..len_end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| truncated(*cursor))?;
        let len = u32::from_le_bytes(len_bytes) as usize;

        let end = len_end + len;
        let chunk = bytes.get(len_end..end).ok_or_else(|| truncated(len_end))?;
        *cursor = end;
        Ok(chunk.to_vec())
    }

    fn encode(data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Vec<u8> {
        let mut bytes = Vec::new();
        for (key, value) in data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }
        bytes
    }

    fn save(&self, data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&Self::encode(data)).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;

        tracing::debug!("[qc-02] 💾 Saved {} keys to {}", data.len(), self.path.display());
        Ok(())
    }

    /// Persist `next` and only then make it the live map.
    fn commit(&mut self, next: BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        self.save(&next)?;
        self.data = next;
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut next = self.data.clone();
        apply_batch(&mut next, operations);
        self.commit(next)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }

    fn clear(&mut self) -> Result<(), KVStoreError> {
        tracing::info!("[qc-02] 🗑️ Wiping storage file {}", self.path.display());
        self.commit(BTreeMap::new())
    }
}

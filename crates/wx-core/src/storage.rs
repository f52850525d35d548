//! Frame persistence.
//!
//! The fetcher hands each downloaded image to a [`FrameStore`] under its
//! [`StorageKey`] and keeps the returned [`FrameSource`] in the frame.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::frame::{FrameSource, StorageKey};

pub trait FrameStore: Send + Sync + 'static {
    /// Persist `bytes` under `key`, replacing any previous content.
    fn put(
        &self,
        key: &StorageKey,
        bytes: Vec<u8>,
    ) -> impl Future<Output = io::Result<FrameSource>> + Send;

    /// Look up a frame stored by an earlier fetch.
    fn get(&self, key: &StorageKey) -> impl Future<Output = Option<FrameSource>> + Send;
}

/// One PNG file per key in a flat directory.
#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl FrameStore for DiskStore {
    async fn put(&self, key: &StorageKey, bytes: Vec<u8>) -> io::Result<FrameSource> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        tokio::fs::write(&path, &bytes).await?;
        debug!("stored {} ({} bytes)", path.display(), bytes.len());
        Ok(FrameSource::File(path))
    }

    async fn get(&self, key: &StorageKey) -> Option<FrameSource> {
        let path = self.path_for(key);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Some(FrameSource::File(path)),
            _ => None,
        }
    }
}

/// Keeps frames in memory; nothing touches the filesystem.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    frames: Arc<Mutex<HashMap<StorageKey, Arc<[u8]>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &StorageKey) -> bool {
        self.frames
            .lock()
            .map(|f| f.contains_key(key))
            .unwrap_or(false)
    }
}

impl FrameStore for MemoryStore {
    async fn put(&self, key: &StorageKey, bytes: Vec<u8>) -> io::Result<FrameSource> {
        let bytes: Arc<[u8]> = bytes.into();
        self.frames
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory store poisoned"))?
            .insert(key.clone(), Arc::clone(&bytes));
        Ok(FrameSource::Memory(bytes))
    }

    async fn get(&self, key: &StorageKey) -> Option<FrameSource> {
        let frames = self.frames.lock().ok()?;
        frames.get(key).cloned().map(FrameSource::Memory)
    }
}

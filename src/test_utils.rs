//! In-memory filesystem for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::fs::Filesystem;

#[derive(Default)]
pub struct MemoryFs {
    existing: Mutex<HashSet<PathBuf>>,
    files: Mutex<HashMap<PathBuf, String>>,
    dirs: Mutex<Vec<PathBuf>>,
    fail_dirs: Mutex<bool>,
    fail_writes: Mutex<bool>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_existing(&self, path: impl Into<PathBuf>) {
        self.existing.lock().unwrap().insert(path.into());
    }

    pub fn fail_dirs(&self) {
        *self.fail_dirs.lock().unwrap() = true;
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    /// Block the next write until the returned sender fires (or is dropped).
    pub fn hold_next_write(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn file(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.dirs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Filesystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.existing.lock().unwrap().contains(path)
    }

    async fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        if *self.fail_dirs.lock().unwrap() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.dirs.lock().unwrap().push(dir.to_path_buf());
        Ok(())
    }

    async fn write(&self, path: &Path, contents: String) -> io::Result<()> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if *self.fail_writes.lock().unwrap() {
            return Err(io::Error::other("disk full"));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), contents);
        Ok(())
    }
}

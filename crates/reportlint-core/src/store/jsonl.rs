//! File-backed document store, one JSON-lines file per collection.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};
use tracing::debug;

use super::{DocumentStore, Filter, Result, apply_changes, with_id};
use crate::error::StoreError;

/// Stores each collection as `<root>/<collection>.jsonl`.
///
/// Writes are serialized through a single lock; inserts append while
/// updates and deletes rewrite the file.
pub struct JsonlStore {
    root: PathBuf,
    connected: AtomicBool,
    lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            connected: AtomicBool::new(false),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `collection`.
    pub fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.trim().is_empty()
            && collection != "."
            && collection != ".."
            && !collection.contains(['/', '\\', '\0']);

        if !valid {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }

        Ok(self.root.join(format!("{collection}.jsonl")))
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(StoreError::NotConnected);
        }
        self.lock.lock().map_err(|_| StoreError::Poisoned)
    }

    fn read_all(&self, path: &Path) -> Result<Vec<Value>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    fn write_all(&self, path: &Path, records: &[Value]) -> Result<()> {
        let tmp = path.with_extension("jsonl.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl DocumentStore for JsonlStore {
    fn connect(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        self.connected.store(true, Ordering::Release);
        debug!("Connected JSON-lines store at {}", self.root.display());
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    fn insert(&self, collection: &str, records: &[Value]) -> Result<Vec<String>> {
        let path = self.collection_path(collection)?;
        let prepared = records.iter().map(with_id).collect::<Result<Vec<_>>>()?;
        let _guard = self.guard()?;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);

        let mut ids = Vec::with_capacity(prepared.len());
        for (id, record) in prepared {
            serde_json::to_writer(&mut writer, &record)?;
            writer.write_all(b"\n")?;
            ids.push(id);
        }
        writer.flush()?;

        Ok(ids)
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        let path = self.collection_path(collection)?;
        let _guard = self.guard()?;

        Ok(self
            .read_all(&path)?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    fn update(&self, collection: &str, filter: &Filter, changes: &Map<String, Value>) -> Result<usize> {
        let path = self.collection_path(collection)?;
        let _guard = self.guard()?;

        let mut records = self.read_all(&path)?;
        let modified = records
            .iter_mut()
            .filter(|r| filter.matches(r))
            .map(|r| apply_changes(r, changes))
            .filter(|modified| *modified)
            .count();

        if modified > 0 {
            self.write_all(&path, &records)?;
        }
        Ok(modified)
    }

    fn delete(&self, collection: &str, filter: &Filter) -> Result<usize> {
        let path = self.collection_path(collection)?;
        let _guard = self.guard()?;

        let records = self.read_all(&path)?;
        let before = records.len();
        let kept: Vec<Value> = records.into_iter().filter(|r| !filter.matches(r)).collect();
        let deleted = before - kept.len();

        if deleted > 0 {
            self.write_all(&path, &kept)?;
        }
        Ok(deleted)
    }
}

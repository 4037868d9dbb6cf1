//! Record tables stored as JSON Lines files.
//!
//! Appends take an exclusive lock. Reads take a shared lock and skip
//! corrupt lines. Updates and deletes rewrite the whole table through a
//! temp file that is renamed over the table file. All locks are held on
//! the table's sidecar lock file, which survives the rename.

use crate::lock::FileLock;
use crate::{Error, Meal, Result, RunHistory, WeightEntry, Workout};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A row that can live in a [`Table`]
pub trait Record: Serialize + DeserializeOwned {
    fn id(&self) -> Uuid;
}

impl Record for Workout {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for RunHistory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Meal {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for WeightEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// JSONL-backed table of records with file locking
#[derive(Clone, Debug)]
pub struct Table<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: Record> Table<T> {
    /// Create a table handle for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append one record
    pub fn append(&self, record: &T) -> Result<()> {
        self.append_all(std::slice::from_ref(record))
    }

    /// Append several records under a single lock
    pub fn append_all(&self, records: &[T]) -> Result<()> {
        self.ensure_parent_dir()?;
        let _lock = FileLock::exclusive(&self.path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(&file);
        for record in records {
            let line = serde_json::to_string(record)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        tracing::debug!("Appended {} records to {:?}", records.len(), self.path);
        Ok(())
    }

    /// Read every record, skipping lines that fail to parse
    pub fn read_all(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let _lock = FileLock::shared(&self.path)?;
        let file = File::open(&self.path)?;
        let records = parse_lines(BufReader::new(file), &self.path)?;
        tracing::debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    pub fn find(&self, id: Uuid) -> Result<Option<T>> {
        Ok(self.read_all()?.into_iter().find(|r| r.id() == id))
    }

    /// Overwrite the table with exactly these records
    pub fn replace_all(&self, records: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.rewrite(|existing| {
            *existing = records.to_vec();
            Ok(())
        })
    }

    /// Remove every record the predicate rejects, returning how many went
    pub fn retain<F>(&self, mut keep: F) -> Result<usize>
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        self.rewrite(|records| {
            let before = records.len();
            records.retain(|r| keep(r));
            removed = before - records.len();
            Ok(())
        })?;
        Ok(removed)
    }

    /// Delete one record by id
    pub fn remove(&self, id: Uuid) -> Result<()> {
        let removed = self.retain(|r| r.id() != id)?;
        if removed == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Modify one record in place and return the updated copy
    pub fn update<F>(&self, id: Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut T) -> Result<()>,
        T: Clone,
    {
        let mut updated = None;
        self.rewrite(|records| {
            let record = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            f(record)?;
            updated = Some(record.clone());
            Ok(())
        })?;
        updated.ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Apply `f` to the full record set and atomically write the result
    ///
    /// The table stays exclusively locked from read to rename.
    pub fn rewrite<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<T>) -> Result<()>,
    {
        self.ensure_parent_dir()?;
        let _lock = FileLock::exclusive(&self.path)?;

        let mut records = if self.path.exists() {
            parse_lines(BufReader::new(File::open(&self.path)?), &self.path)?
        } else {
            Vec::new()
        };

        f(&mut records)?;
        self.write_atomic(&records)
    }

    fn write_atomic(&self, records: &[T]) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "table path missing parent")
        })?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            for record in records {
                let line = serde_json::to_string(record)?;
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Rewrote {:?} with {} records", self.path, records.len());
        Ok(())
    }
}

fn parse_lines<T: DeserializeOwned, R: BufRead>(reader: R, path: &Path) -> Result<Vec<T>> {
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse record in {:?} at line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    Ok(records)
}

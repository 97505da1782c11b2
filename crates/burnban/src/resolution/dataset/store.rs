use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::resolution::domain::{CountyRecord, DatasetSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot file error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot file is not valid: {0}")]
    Csv(#[from] csv::Error),
}

/// `;`-delimited snapshot file with a `County;Burn Ban;Date;CountyID` header.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time of the persisted file, if there is one. [`SnapshotStore::save`]
    /// stamps it with the snapshot's `fetched_at`.
    pub fn persisted_at(&self) -> Option<DateTime<Utc>> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }

    /// Writes to a sibling temp file then renames over the target, so a reader
    /// sees either the old snapshot or the new one.
    pub fn save(&self, snapshot: &DatasetSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        if let Err(err) = write_staging(&staging, snapshot) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }

        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    /// `Ok(None)` when nothing has been persisted yet.
    pub fn load(&self) -> Result<Option<DatasetSnapshot>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let fetched_at = self.persisted_at().unwrap_or_else(Utc::now);
        let records = read_records(file)?;
        Ok(Some(DatasetSnapshot::new(records, fetched_at)))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

// The mtime is set last so the write itself does not overwrite it.
fn write_staging(staging: &Path, snapshot: &DatasetSnapshot) -> Result<(), StoreError> {
    let file = File::create(staging)?;
    write_records(&file, &snapshot.records)?;
    file.set_modified(SystemTime::from(snapshot.fetched_at))?;
    Ok(())
}

pub(crate) fn write_records<W: Write>(writer: W, records: &[CountyRecord]) -> Result<(), StoreError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(["County", "Burn Ban", "Date", "CountyID"])?;
    for record in records {
        csv_writer.serialize(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub(crate) fn read_records<R: Read>(reader: R) -> Result<Vec<CountyRecord>, StoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<CountyRecord>() {
        records.push(row?);
    }

    Ok(records)
}

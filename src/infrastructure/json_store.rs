//! Durable store backed by a single JSON document.
//!
//! Every transaction holds an exclusive lock on `<data_file>.lock`, reloads the
//! document, runs its work and writes the result before the lock is released.
//! Handles in other processes therefore never validate against a stale forest.
//! Writes go to a temp file next to the data file and are renamed into place,
//! so the file on disk is always either the old or the new committed state.
//!
//! Reads outside a transaction see the state as of the handle's last open or commit.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, instrument, trace};

use crate::domain::{BusinessUnit, Company, CompanyId, ProcessRef, UnitId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::memory_store::{MemoryStore, StoreDocument, StoreState};
use crate::infrastructure::traits::{Registry, UnitStore, UnitTransaction};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    #[instrument(level = "debug")]
    pub fn open(path: &Path) -> StoreResult<Self> {
        let state = read_document(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            lock_path: lock_path_for(path),
            inner: MemoryStore::with_state(state),
        })
    }

    /// Run `work` against the current on-disk state under the cross-process lock.
    fn commit<T, E, W>(&self, work: W) -> Result<T, E>
    where
        E: From<StoreError>,
        W: FnOnce(&mut StoreState) -> Result<T, E>,
    {
        // Released when the file is closed at the end of this scope
        let _lock = self.lock_exclusive()?;

        self.inner.reset(read_document(&self.path)?)?;
        self.inner
            .commit_with(work, |state| write_document(&self.path, state))
    }

    fn lock_exclusive(&self) -> StoreResult<File> {
        ensure_parent_dir(&self.lock_path)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(|e| StoreError::io(format!("open lock {}", self.lock_path.display()), e))?;

        // Blocks while another writer holds the lock
        file.lock_exclusive()
            .map_err(|e| StoreError::io(format!("lock {}", self.lock_path.display()), e))?;
        trace!("locked {}", self.lock_path.display());
        Ok(file)
    }
}

/// Sidecar lock file: `units.json` → `units.json.lock`.
fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

fn ensure_parent_dir(path: &Path) -> StoreResult<PathBuf> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)
        .map_err(|e| StoreError::io(format!("create directory {}", dir.display()), e))?;
    Ok(dir)
}

/// Load the document at `path`; a missing file is the empty state.
fn read_document(path: &Path) -> StoreResult<StoreState> {
    if !path.exists() {
        debug!("data file {} does not exist yet, starting empty", path.display());
        return Ok(StoreState::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| StoreError::io(format!("read data file {}", path.display()), e))?;
    let doc: StoreDocument =
        serde_json::from_str(&content).map_err(|e| StoreError::Serialization {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!(
        "loaded {} companies, {} units",
        doc.companies.len(),
        doc.units.len()
    );
    Ok(StoreState::from(doc))
}

/// Serialize `state` and atomically replace the file at `path`.
fn write_document(path: &Path, state: &StoreState) -> StoreResult<()> {
    let dir = ensure_parent_dir(path)?;

    let tmp = NamedTempFile::new_in(&dir)
        .map_err(|e| StoreError::io(format!("create temp file in {}", dir.display()), e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, &StoreDocument::from(state)).map_err(|e| {
            StoreError::Serialization {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        writer
            .flush()
            .map_err(|e| StoreError::io(format!("write {}", path.display()), e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(format!("sync {}", path.display()), e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::io(format!("replace {}", path.display()), e.error))?;
    debug!("wrote {}", path.display());
    Ok(())
}

impl UnitStore for JsonFileStore {
    fn scan(&self, company: Option<CompanyId>) -> StoreResult<Vec<BusinessUnit>> {
        self.inner.scan(company)
    }

    fn get(&self, id: UnitId) -> StoreResult<Option<BusinessUnit>> {
        UnitStore::get(&self.inner, id)
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn UnitTransaction) -> Result<T, E>,
    {
        self.commit(|state| work(state))
    }
}

impl Registry for JsonFileStore {
    fn add_company(&self, name: &str) -> StoreResult<Company> {
        self.commit(|state| Ok(state.add_company(name)))
    }

    fn companies(&self) -> StoreResult<Vec<Company>> {
        self.inner.companies()
    }

    fn add_process(&self, unit: UnitId, name: &str) -> StoreResult<ProcessRef> {
        self.commit(|state| state.add_process(unit, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_data_file_when_deriving_lock_path_then_appends_suffix() {
        assert_eq!(
            lock_path_for(Path::new("/var/lib/orgtree/units.json")),
            PathBuf::from("/var/lib/orgtree/units.json.lock")
        );
    }
}

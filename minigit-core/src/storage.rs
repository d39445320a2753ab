use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{CommitLog, InitOutcome, COMMIT_ID_PREFIX};
use crate::workspace::{key_path, path_to_key, validate_key};
use filetime::FileTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const REPO_DIR: &str = ".minigit";

const STAGING_DIR: &str = "staging";
const COMMITS_DIR: &str = "commits";
const COMMIT_INDEX_FILE: &str = "commits.json";
const LEGACY_LOG_FILE: &str = "log.txt";
const CONFIG_FILE: &str = "config.toml";
const TEMP_PREFIX: &str = ".tmp-";

/// Storage backend for a repository.
///
/// Staged entries are addressed by key: a file name, or a `/`-separated
/// relative path when the repository uses relative path mode.
///
/// Implementations must uphold:
/// - `initialize` and `ensure_layout` are idempotent and never discard data.
/// - `staged_keys` returns keys in lexicographic order.
/// - `create_snapshot` never replaces an existing snapshot.
/// - I/O errors are propagated, never swallowed.
pub trait Store {
    fn is_initialized(&self) -> bool;

    /// Create the layout, or complete it if the repository already exists.
    fn initialize(&self) -> Result<InitOutcome>;

    /// Recreate any missing directory of an existing layout.
    fn ensure_layout(&self) -> Result<()>;

    fn read_config(&self) -> Result<Config>;

    /// Load the commit index. Absent means empty.
    fn read_log(&self) -> Result<CommitLog>;

    /// Replace the commit index with `log`.
    fn write_log(&self, log: &CommitLog) -> Result<()>;

    fn staged_keys(&self) -> Result<Vec<String>>;

    /// Copy the working file at `source` into staging under `key`,
    /// replacing any earlier copy.
    fn stage(&self, key: &str, source: &Path) -> Result<()>;

    fn read_staged(&self, key: &str) -> Result<Vec<u8>>;

    fn clear_staging(&self) -> Result<()>;

    /// Materialize snapshot `id` from the staged copies of `keys`.
    ///
    /// Fails with [`Error::CommitIdCollision`] when `id` already exists.
    fn create_snapshot(&self, id: &str, keys: &[String]) -> Result<()>;

    fn snapshot_ids(&self) -> Result<Vec<String>>;

    fn read_snapshot_file(&self, id: &str, key: &str) -> Result<Vec<u8>>;

    /// Snapshots the commit index does not reference, left behind by a
    /// commit that stopped between creating the snapshot and writing the log.
    fn orphaned_snapshots(&self) -> Result<Vec<String>> {
        let log = self.read_log()?;
        Ok(self
            .snapshot_ids()?
            .into_iter()
            .filter(|id| !log.contains_id(id))
            .collect())
    }
}

/// Store kept under `<workdir>/.minigit`:
///
/// ```text
/// .minigit/
///   staging/              staged file copies
///   commits/<commit_id>/  one verbatim snapshot per commit
///   commits.json          commit index, a JSON array of records
///   log.txt               empty placeholder kept for older layouts
///   config.toml           optional, see [`Config`]
/// ```
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Store for the repository of the working directory `workdir`.
    pub fn new<P: AsRef<Path>>(workdir: P) -> Self {
        Self {
            root: workdir.as_ref().join(REPO_DIR),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging_path(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    pub fn commits_path(&self) -> PathBuf {
        self.root.join(COMMITS_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(COMMIT_INDEX_FILE)
    }

    pub fn legacy_log_path(&self) -> PathBuf {
        self.root.join(LEGACY_LOG_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn snapshot_path(&self, id: &str) -> PathBuf {
        self.commits_path().join(id)
    }

    fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.staging_path())?;
        fs::create_dir_all(self.commits_path())?;
        Ok(())
    }
}

impl Store for FsStore {
    fn is_initialized(&self) -> bool {
        self.root.is_dir()
    }

    fn initialize(&self) -> Result<InitOutcome> {
        let outcome = if self.is_initialized() {
            InitOutcome::AlreadyInitialized
        } else {
            InitOutcome::Created
        };

        self.create_dirs()?;

        let legacy_log = self.legacy_log_path();
        if !legacy_log.exists() {
            fs::write(&legacy_log, "")?;
        }

        if !self.index_path().exists() {
            self.write_log(&CommitLog::new())?;
        }

        info!("Repository at {:?}: {:?}", self.root, outcome);
        Ok(outcome)
    }

    fn ensure_layout(&self) -> Result<()> {
        self.create_dirs()
    }

    fn read_config(&self) -> Result<Config> {
        Config::load(self.config_path())
    }

    fn read_log(&self) -> Result<CommitLog> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(CommitLog::new());
        }

        let text = fs::read_to_string(&path)?;
        if text.trim().is_empty() {
            return Ok(CommitLog::new());
        }

        let log: CommitLog = serde_json::from_str(&text)?;
        for record in log.records() {
            for key in &record.files {
                validate_key(key)?;
            }
        }
        Ok(log)
    }

    fn write_log(&self, log: &CommitLog) -> Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        log.serialize(&mut serializer)?;

        // write beside the index, then swap it in
        let path = self.index_path();
        let temp_path = self.root.join(format!("{}{}", TEMP_PREFIX, COMMIT_INDEX_FILE));
        fs::write(&temp_path, &buf)?;
        fs::rename(&temp_path, &path)?;

        debug!("Wrote {} commit records to {:?}", log.len(), path);
        Ok(())
    }

    fn staged_keys(&self) -> Result<Vec<String>> {
        let staging = self.staging_path();
        if !staging.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&staging).min_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(key) = entry
                .path()
                .strip_prefix(&staging)
                .ok()
                .and_then(path_to_key)
            {
                keys.push(key);
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn stage(&self, key: &str, source: &Path) -> Result<()> {
        let dest = key_path(&self.staging_path(), key)?;
        if dest.is_file() && same_file(source, &dest)? {
            debug!("{:?} is already the staged copy of {}", source, key);
            return Ok(());
        }
        if dest.is_file() {
            // a read-only earlier copy would refuse to be overwritten
            fs::remove_file(&dest)?;
        }

        copy_preserving(source, &dest)?;
        debug!("Staged {:?} as {}", source, key);
        Ok(())
    }

    fn read_staged(&self, key: &str) -> Result<Vec<u8>> {
        fs::read(key_path(&self.staging_path(), key)?).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::StagedFileNotFound(key.to_string()),
            _ => Error::Io(e),
        })
    }

    fn clear_staging(&self) -> Result<()> {
        let staging = self.staging_path();
        if !staging.is_dir() {
            return Ok(());
        }

        for entry in fs::read_dir(&staging)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }

        debug!("Cleared staging area");
        Ok(())
    }

    fn create_snapshot(&self, id: &str, keys: &[String]) -> Result<()> {
        let snapshot = self.snapshot_path(id);
        if snapshot.exists() {
            return Err(Error::CommitIdCollision(id.to_string()));
        }

        // build under a temporary name so a half-copied snapshot never
        // carries a commit id
        let temp_dir = self.commits_path().join(format!("{}{}", TEMP_PREFIX, id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir)?;
        }
        fs::create_dir_all(&temp_dir)?;

        let staging = self.staging_path();
        for key in keys {
            copy_preserving(&key_path(&staging, key)?, &key_path(&temp_dir, key)?)?;
        }

        fs::rename(&temp_dir, &snapshot)?;
        debug!("Created snapshot {} with {} files", id, keys.len());
        Ok(())
    }

    fn snapshot_ids(&self) -> Result<Vec<String>> {
        let commits = self.commits_path();
        if !commits.is_dir() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&commits)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() && name.starts_with(COMMIT_ID_PREFIX) {
                ids.push(name);
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn read_snapshot_file(&self, id: &str, key: &str) -> Result<Vec<u8>> {
        fs::read(key_path(&self.snapshot_path(id), key)?).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::SnapshotNotFound(format!("{}/{}", id, key)),
            _ => Error::Io(e),
        })
    }
}

fn same_file(a: &Path, b: &Path) -> Result<bool> {
    Ok(a.canonicalize()? == b.canonicalize()?)
}

/// Copy bytes, permissions and access/modification times.
fn copy_preserving(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::copy(source, dest)?;

    let metadata = fs::metadata(source)?;
    filetime::set_file_times(
        dest,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;

    Ok(())
}

/// In-memory store, for tests and embedding.
///
/// Working files are still read from disk when staged; everything kept
/// under `.minigit` lives in maps behind `RwLock`s.
pub struct MemoryStore {
    initialized: RwLock<bool>,
    config: Config,
    log: RwLock<CommitLog>,
    staging: RwLock<BTreeMap<String, Vec<u8>>>,
    snapshots: RwLock<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            initialized: RwLock::new(false),
            config,
            log: RwLock::new(CommitLog::new()),
            staging: RwLock::new(BTreeMap::new()),
            snapshots: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert a snapshot without touching the log, as an interrupted commit
    /// would leave it.
    pub fn insert_snapshot(&self, id: &str, files: BTreeMap<String, Vec<u8>>) {
        self.snapshots
            .write()
            .expect("lock poisoned")
            .insert(id.to_string(), files);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn is_initialized(&self) -> bool {
        *self.initialized.read().expect("lock poisoned")
    }

    fn initialize(&self) -> Result<InitOutcome> {
        let mut initialized = self.initialized.write().expect("lock poisoned");
        if *initialized {
            return Ok(InitOutcome::AlreadyInitialized);
        }

        *initialized = true;
        Ok(InitOutcome::Created)
    }

    fn ensure_layout(&self) -> Result<()> {
        Ok(())
    }

    fn read_config(&self) -> Result<Config> {
        Ok(self.config.clone())
    }

    fn read_log(&self) -> Result<CommitLog> {
        Ok(self.log.read().expect("lock poisoned").clone())
    }

    fn write_log(&self, log: &CommitLog) -> Result<()> {
        *self.log.write().expect("lock poisoned") = log.clone();
        Ok(())
    }

    fn staged_keys(&self) -> Result<Vec<String>> {
        Ok(self
            .staging
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect())
    }

    fn stage(&self, key: &str, source: &Path) -> Result<()> {
        let content = fs::read(source)?;
        self.staging
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), content);
        Ok(())
    }

    fn read_staged(&self, key: &str) -> Result<Vec<u8>> {
        self.staging
            .read()
            .expect("lock poisoned")
            .get(key)
            .cloned()
            .ok_or_else(|| Error::StagedFileNotFound(key.to_string()))
    }

    fn clear_staging(&self) -> Result<()> {
        self.staging.write().expect("lock poisoned").clear();
        Ok(())
    }

    fn create_snapshot(&self, id: &str, keys: &[String]) -> Result<()> {
        let mut snapshots = self.snapshots.write().expect("lock poisoned");
        if snapshots.contains_key(id) {
            return Err(Error::CommitIdCollision(id.to_string()));
        }

        let files = keys
            .iter()
            .map(|key| Ok((key.clone(), self.read_staged(key)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        snapshots.insert(id.to_string(), files);
        Ok(())
    }

    fn snapshot_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .snapshots
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect())
    }

    fn read_snapshot_file(&self, id: &str, key: &str) -> Result<Vec<u8>> {
        self.snapshots
            .read()
            .expect("lock poisoned")
            .get(id)
            .and_then(|files| files.get(key))
            .cloned()
            .ok_or_else(|| Error::SnapshotNotFound(format!("{}/{}", id, key)))
    }
}

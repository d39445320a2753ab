use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{AddOutcome, CommitLog, CommitRecord, InitOutcome};
use crate::status::{StatusInputs, StatusReport};
use crate::storage::{FsStore, Store};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct Repository<S: Store = FsStore> {
    store: S,
    workspace: Workspace,
    config: Config,
    clock: Box<dyn Clock>,
}

impl Repository<FsStore> {
    /// Repository whose working directory is `workdir`. The repository
    /// itself need not exist yet; [`Repository::init`] creates it.
    pub fn open<P: AsRef<Path>>(workdir: P) -> Result<Self> {
        let workdir = workdir.as_ref();
        Self::with_store(FsStore::new(workdir), workdir)
    }
}

impl<S: Store> Repository<S> {
    pub fn with_store<P: Into<PathBuf>>(store: S, workdir: P) -> Result<Self> {
        let config = if store.is_initialized() {
            store.read_config()?
        } else {
            Config::default()
        };

        let workspace = Workspace::new(workdir).with_ignored(config.status.ignore.clone());

        Ok(Self {
            store,
            workspace,
            config,
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_initialized()
    }

    /// Create the repository, or complete the layout of an existing one.
    pub fn init(&mut self) -> Result<InitOutcome> {
        let outcome = self.store.initialize()?;

        self.config = self.store.read_config()?;
        self.workspace = Workspace::new(self.workspace.root())
            .with_ignored(self.config.status.ignore.clone());

        Ok(outcome)
    }

    /// Stage one working-directory file.
    pub fn add(&self, path: &str) -> Result<AddOutcome> {
        self.require_initialized()?;

        if !self.workspace.is_file(path) {
            debug!("Nothing to stage at {}", path);
            return Ok(AddOutcome::Missing(path.to_string()));
        }

        if self.workspace.is_inside_repository(path)? {
            return Err(Error::PathInsideRepository(path.to_string()));
        }

        let key = self
            .workspace
            .staged_key(path, self.config.core.path_mode)?;

        self.store.ensure_layout()?;
        self.store.stage(&key, &self.workspace.resolve(path))?;

        info!("Staged {} as {}", path, key);
        Ok(AddOutcome::Staged {
            path: path.to_string(),
            key,
        })
    }

    /// Snapshot the staging area as a new commit and empty it.
    ///
    /// The steps are not atomic as a whole. A failure after the snapshot is
    /// in place but before the log is written leaves an orphaned snapshot;
    /// see [`Store::orphaned_snapshots`].
    pub fn commit(&self, message: &str) -> Result<CommitRecord> {
        self.require_initialized()?;
        self.store.ensure_layout()?;

        for orphan in self.store.orphaned_snapshots()? {
            warn!("Snapshot {} is not referenced by the commit log", orphan);
        }

        let now = self.clock.now();
        let id = CommitRecord::id_for(&now);
        let files = self.store.staged_keys()?;

        self.store.create_snapshot(&id, &files)?;

        let record = CommitRecord::new(message, now, files);
        let mut log = self.store.read_log()?;
        log.push(record.clone());
        self.store.write_log(&log)?;

        self.store.clear_staging()?;

        info!("Committed {} with {} files", record.id, record.files.len());
        Ok(record)
    }

    /// Full commit history in commit order.
    pub fn log(&self) -> Result<CommitLog> {
        self.require_initialized()?;
        self.store.read_log()
    }

    pub fn status(&self) -> Result<StatusReport> {
        self.require_initialized()?;

        let mode = self.config.core.path_mode;
        let log = self.store.read_log()?;
        let inputs = StatusInputs {
            working: self.workspace.entries(mode)?,
            staged: self.store.staged_keys()?.into_iter().collect(),
            last_committed: log.last_committed_files().iter().cloned().collect(),
        };

        inputs.classify(
            |name| match self.workspace.read(name)? {
                Some(working) => Ok(Some(working != self.store.read_staged(name)?)),
                None => Ok(None),
            },
            |name| self.workspace.exists(name),
        )
    }

    fn require_initialized(&self) -> Result<()> {
        if self.store.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotARepository(self.workspace.root().to_path_buf()))
        }
    }
}

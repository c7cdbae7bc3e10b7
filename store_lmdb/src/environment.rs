//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// Default LMDB map size: 256 MiB is far beyond what the transfer ledger
/// ever accumulates.
pub const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;
/// One named database per logical store.
pub const DEFAULT_MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    pub(crate) transfers_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path) -> Result<Self, LmdbError> {
        Self::open_with(path, DEFAULT_MAP_SIZE, DEFAULT_MAX_DBS)
    }

    /// Open with explicit sizing, for tests and constrained deployments.
    pub fn open_with(path: &Path, map_size: usize, max_dbs: u32) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create {}: {e}", path.display())))?;

        // SAFETY: the environment directory is owned by this process and is
        // not opened twice within it.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let transfers_db = env.create_database(&mut wtxn, Some("transfers"))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), "opened LMDB environment");
        Ok(Self {
            env: Arc::new(env),
            transfers_db,
        })
    }
}

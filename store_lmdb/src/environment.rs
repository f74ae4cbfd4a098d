//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::integrity::check_data_dir;
use crate::meta::LmdbMetaStore;
use crate::migration::Migrator;
use crate::oracle::{LmdbOracleStore, OracleDatabases};
use crate::LmdbError;

pub(crate) const PARAMS_DB: &str = "params";
pub(crate) const EXCHANGE_RATES_DB: &str = "exchange_rates";
pub(crate) const FEEDERS_DB: &str = "feeder_delegations";
pub(crate) const PREVOTES_DB: &str = "aggregate_prevotes";
pub(crate) const VOTES_DB: &str = "aggregate_votes";
pub(crate) const TOBIN_TAXES_DB: &str = "tobin_taxes";
pub(crate) const MISS_COUNTERS_DB: &str = "miss_counters";
pub(crate) const META_DB: &str = "meta";

/// Every named database the environment creates.
pub const DATABASE_NAMES: &[&str] = &[
    PARAMS_DB,
    EXCHANGE_RATES_DB,
    FEEDERS_DB,
    PREVOTES_DB,
    VOTES_DB,
    TOBIN_TAXES_DB,
    MISS_COUNTERS_DB,
    META_DB,
];

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    path: PathBuf,
    oracle_dbs: OracleDatabases,
    meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path, creating every
    /// database and bringing the schema up to date.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        check_data_dir(path).map_err(LmdbError::Schema)?;
        std::fs::create_dir_all(path)?;

        // SAFETY: one environment per path per process; the node opens it once.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let mut create = |name: &str| env.create_database::<Bytes, Bytes>(&mut wtxn, Some(name));
        let oracle_dbs = OracleDatabases {
            params: create(PARAMS_DB)?,
            exchange_rates: create(EXCHANGE_RATES_DB)?,
            feeders: create(FEEDERS_DB)?,
            prevotes: create(PREVOTES_DB)?,
            votes: create(VOTES_DB)?,
            tobin_taxes: create(TOBIN_TAXES_DB)?,
            miss_counters: create(MISS_COUNTERS_DB)?,
        };
        let meta_db = create(META_DB)?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            path: path.to_path_buf(),
            oracle_dbs,
            meta_db,
        };
        Migrator::run(&environment.meta_store())?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(environment)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// A handle implementing every oracle storage trait.
    pub fn oracle_store(&self) -> LmdbOracleStore {
        LmdbOracleStore {
            env: Arc::clone(&self.env),
            dbs: self.oracle_dbs,
            meta_db: self.meta_db,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }

    /// Run the integrity check against this environment.
    pub fn check_integrity(&self) -> Result<crate::integrity::IntegrityReport, LmdbError> {
        crate::integrity::check_integrity(self.env())
    }
}

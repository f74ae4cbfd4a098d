//! LMDB storage backend for the IQ oracle.
//!
//! Implements all storage traits from `iq-store` using the `heed` LMDB bindings.
//! Each logical store maps to one LMDB database within a single environment.
//! Keys are the natural string key (denomination or bech32 address), so LMDB's
//! byte ordering gives the sorted iteration the traits promise.

pub mod environment;
pub mod error;
pub mod integrity;
pub mod meta;
pub mod migration;
pub mod oracle;
pub mod write_batch;

mod codec;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
pub use oracle::LmdbOracleStore;

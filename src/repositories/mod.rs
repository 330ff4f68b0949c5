//! Repositorios
//!
//! Acceso al almacén local de registros y a sus backends clave-valor.

pub mod record_store;
pub mod storage;

pub use record_store::{Record, RecordStore, Versioned};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StoreError};

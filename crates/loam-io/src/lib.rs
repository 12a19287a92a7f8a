//! Edit-table persistence: JSON encoding, validation on import, and storage backends.
#![forbid(unsafe_code)]

mod error;
mod store;
mod table;

pub use error::PersistError;
pub use store::{EditPersistence, JsonDirStore, MemoryStore};
pub use table::{
    ImportReport, decode_table, encode_table, parse_key, read_table_file, write_table_file,
};

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use loam_blocks::Voxel;
use loam_geom::IVec3;

use crate::PersistError;
use crate::table::{ImportReport, read_table_file, write_table_file};

/// Durable home for one edit table per seed.
pub trait EditPersistence: Send {
    /// Loads the table for `seed`. A missing table is an empty report, not an error.
    fn load(&self, seed: &str) -> Result<ImportReport, PersistError>;
    fn save(&mut self, seed: &str, edits: &[(IVec3, Voxel)]) -> Result<(), PersistError>;
    fn clear(&mut self, seed: &str) -> Result<(), PersistError>;
}

/// One `edits_v1_<seed>.json` file per seed inside a directory.
#[derive(Clone, Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
    world_height: usize,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            world_height: 256,
        }
    }

    pub fn with_world_height(mut self, world_height: usize) -> Self {
        self.world_height = world_height;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Seed names are percent-encoded outside `[A-Za-z0-9_-]` so any string maps
    /// to a distinct, portable file name.
    pub fn path_for(&self, seed: &str) -> PathBuf {
        let mut name = String::from("edits_v1_");
        for b in seed.bytes() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
                name.push(b as char);
            } else {
                name.push_str(&format!("%{b:02X}"));
            }
        }
        name.push_str(".json");
        self.dir.join(name)
    }
}

impl EditPersistence for JsonDirStore {
    fn load(&self, seed: &str) -> Result<ImportReport, PersistError> {
        let path = self.path_for(seed);
        match read_table_file(&path, self.world_height) {
            Err(PersistError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(ImportReport::default()),
            other => other,
        }
    }

    fn save(&mut self, seed: &str, edits: &[(IVec3, Voxel)]) -> Result<(), PersistError> {
        let path = self.path_for(seed);
        write_table_file(&path, edits)?;
        log::debug!("saved {} edits to {}", edits.len(), path.display());
        Ok(())
    }

    fn clear(&mut self, seed: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path_for(seed)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-process store, used by tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<(IVec3, Voxel)>>,
    pub saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, seed: &str) -> Option<&[(IVec3, Voxel)]> {
        self.tables.get(seed).map(Vec::as_slice)
    }
}

impl EditPersistence for MemoryStore {
    fn load(&self, seed: &str) -> Result<ImportReport, PersistError> {
        Ok(ImportReport {
            entries: self.tables.get(seed).cloned().unwrap_or_default(),
            discarded: 0,
        })
    }

    fn save(&mut self, seed: &str, edits: &[(IVec3, Voxel)]) -> Result<(), PersistError> {
        self.tables.insert(seed.to_owned(), edits.to_vec());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self, seed: &str) -> Result<(), PersistError> {
        self.tables.remove(seed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_escaped() {
        let s = JsonDirStore::new("/tmp/x");
        assert_eq!(
            s.path_for("default"),
            PathBuf::from("/tmp/x/edits_v1_default.json")
        );
        assert_eq!(
            s.path_for("a b/c"),
            PathBuf::from("/tmp/x/edits_v1_a%20b%2Fc.json")
        );
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut m = MemoryStore::new();
        let e = vec![(IVec3::new(1, 2, 3), Voxel::Sand)];
        m.save("s", &e).unwrap();
        assert_eq!(m.load("s").unwrap().entries, e);
        m.clear("s").unwrap();
        assert!(m.load("s").unwrap().entries.is_empty());
    }
}

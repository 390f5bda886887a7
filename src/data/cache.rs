use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use super::loader::load_file;
use super::model::SalesDataset;

/// Loaded datasets, keyed by source file.
///
/// A file is read once per process. Nothing is ever invalidated: edits to a
/// file after its first load are not seen until restart.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<SalesDataset>>,
}

impl DatasetCache {
    /// Return the cached dataset for `path`, loading it on first access.
    /// Failed loads are not cached.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<SalesDataset>> {
        let key = source_key(path);
        if let Some(ds) = self.entries.get(&key) {
            log::debug!("dataset cache hit for {}", key.display());
            return Ok(Arc::clone(ds));
        }

        let ds = Arc::new(load_file(path)?);
        log::info!("cached {} records from {}", ds.len(), key.display());
        self.entries.insert(key, Arc::clone(&ds));
        Ok(ds)
    }
}

/// Canonical path when the file can be resolved, the given path otherwise.
fn source_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const HEADER: &str =
        "Tanggal,Harga,Billing Item,Jenis Kelamin,Nama Toko,Brand Name,Group Name,Rating";

    #[test]
    fn second_access_reuses_the_loaded_dataset() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{HEADER}\n2024-01-01,1.000,1,Pria,Toko A,Asus,Laptop,5").unwrap();
        file.flush().unwrap();

        let mut cache = DatasetCache::default();
        let first = cache.get_or_load(file.path()).unwrap();

        // Appending a row must not show up: the cache never re-reads.
        writeln!(file, "2024-01-02,2.000,1,Wanita,Toko B,Acer,Mouse,4").unwrap();
        file.flush().unwrap();

        let second = cache.get_or_load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
        assert_eq!(cache.entries.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let mut cache = DatasetCache::default();
        assert!(cache.get_or_load(Path::new("/nonexistent/toko.csv")).is_err());
        assert!(cache.entries.is_empty());
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{self, LoadOptions};
use super::model::{Dataset, Table};
use crate::error::LoadError;

/// Keeps the most recently loaded dataset so that reopening the same source
/// does not re-read the file. A different path or different load options
/// replace the entry.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    options: LoadOptions,
    dataset: Arc<Dataset>,
}

impl DatasetCache {
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> Result<Arc<Dataset>, LoadError> {
        self.get_or_load_with(path, options, loader::load_file)
    }

    pub fn get_or_load_with<F>(
        &mut self,
        path: &Path,
        options: &LoadOptions,
        load: F,
    ) -> Result<Arc<Dataset>, LoadError>
    where
        F: FnOnce(&Path, &LoadOptions) -> Result<Table, LoadError>,
    {
        if let Some(entry) = &self.entry {
            if entry.path == path && entry.options == *options {
                log::debug!("Using cached dataset for {}", path.display());
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        let dataset = Arc::new(Dataset::new(load(path, options)?));
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            options: *options,
            dataset: Arc::clone(&dataset),
        });
        Ok(dataset)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn counting_loader(
        count: &Cell<usize>,
    ) -> impl Fn(&Path, &LoadOptions) -> Result<Table, LoadError> + '_ {
        move |_: &Path, _: &LoadOptions| {
            count.set(count.get() + 1);
            Ok(Table::from_text_records(vec!["a".into()], vec![vec!["1".into()]]))
        }
    }

    #[test]
    fn same_path_is_loaded_once() {
        let count = Cell::new(0);
        let mut cache = DatasetCache::default();
        let options = LoadOptions::default();
        let first = cache
            .get_or_load_with(Path::new("a.csv"), &options, counting_loader(&count))
            .unwrap();
        let second = cache
            .get_or_load_with(Path::new("a.csv"), &options, counting_loader(&count))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn new_path_or_options_reload() {
        let count = Cell::new(0);
        let mut cache = DatasetCache::default();
        let options = LoadOptions::default();
        cache
            .get_or_load_with(Path::new("a.csv"), &options, counting_loader(&count))
            .unwrap();
        cache
            .get_or_load_with(Path::new("b.csv"), &options, counting_loader(&count))
            .unwrap();
        let latin1 = LoadOptions {
            encoding: loader::TextEncoding::Latin1,
            ..options
        };
        cache
            .get_or_load_with(Path::new("b.csv"), &latin1, counting_loader(&count))
            .unwrap();
        assert_eq!(count.get(), 3);

        cache.invalidate();
        cache
            .get_or_load_with(Path::new("b.csv"), &latin1, counting_loader(&count))
            .unwrap();
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn failed_load_keeps_previous_entry() {
        let count = Cell::new(0);
        let mut cache = DatasetCache::default();
        let options = LoadOptions::default();
        cache
            .get_or_load_with(Path::new("a.csv"), &options, counting_loader(&count))
            .unwrap();
        let err = cache.get_or_load_with(Path::new("b.xlsx"), &options, |_, _| {
            Err(LoadError::UnsupportedExtension("xlsx".into()))
        });
        assert!(err.is_err());
        cache
            .get_or_load_with(Path::new("a.csv"), &options, counting_loader(&count))
            .unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn reads_real_files_through_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        std::fs::write(&path, "gender,math\nM,70\n").unwrap();
        let mut cache = DatasetCache::default();
        let dataset = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.specs.len(), 2);
    }
}

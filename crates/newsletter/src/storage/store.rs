//! Per-category CSV files under the data directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::records::{Expert, Opportunity, Record};
use crate::category::Category;
use crate::error::StorageError;

/// Name of the run state file.
pub const STATE_FILE: &str = "state.json";

/// Name of the search cache file.
pub const CACHE_FILE: &str = "search_cache.json";

/// Everything accumulated for one digest.
#[derive(Debug, Clone, Default)]
pub struct Accumulated {
    pub experts: Vec<Expert>,
    pub grants: Vec<Opportunity>,
    pub events: Vec<Opportunity>,
    pub reports: Vec<Opportunity>,
}

impl Accumulated {
    /// Row count for a category.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Experts => self.experts.len(),
            Category::Grants => self.grants.len(),
            Category::Events => self.events.len(),
            Category::Reports => self.reports.len(),
        }
    }

    /// Total rows across categories.
    #[must_use]
    pub fn total(&self) -> usize {
        Category::all().iter().map(|c| self.count(*c)).sum()
    }
}

/// Flat-file store rooted at the data directory.
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    /// Create a store rooted at `dir`. Nothing is created until written.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a category file.
    #[must_use]
    pub fn path_for(&self, category: Category) -> PathBuf {
        self.dir.join(category.file_name())
    }

    /// Path of the run state file.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Path of the search cache file.
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE)
    }

    /// Read every row of a category file.
    ///
    /// A missing or unreadable file is empty; rows that fail to parse are
    /// skipped.
    #[must_use]
    pub fn load<R: Record>(&self, category: Category) -> Vec<R> {
        let path = self.path_for(category);

        let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(&path) {
            Ok(reader) => reader,
            Err(e) => {
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "Category file unreadable, treating as empty");
                }
                return Vec::new();
            }
        };

        let mut rows = Vec::new();
        for (line, row) in reader.deserialize::<R>().enumerate() {
            match row {
                Ok(record) => rows.push(record),
                Err(e) => warn!(path = %path.display(), row = line + 1, error = %e, "Skipping malformed row"),
            }
        }
        rows
    }

    /// Merge `incoming` into a category file, skipping keys already stored.
    ///
    /// Duplicates inside `incoming` are also dropped, first one wins. The
    /// file is rewritten in full. Returns the number of rows added.
    pub fn append_unique<R: Record>(
        &self,
        category: Category,
        incoming: &[R],
    ) -> Result<usize, StorageError> {
        let mut rows: Vec<R> = self.load(category);
        let mut keys: HashSet<String> = rows.iter().map(|r| r.key().to_string()).collect();

        let before = rows.len();
        for record in incoming {
            if keys.insert(record.key().to_string()) {
                rows.push(record.clone());
            }
        }
        let added = rows.len() - before;

        self.write_all(category, &rows)?;

        info!(
            category = %category,
            added,
            skipped = incoming.len() - added,
            total = rows.len(),
            "Appended unique rows"
        );
        Ok(added)
    }

    fn write_all<R: Record>(&self, category: Category, rows: &[R]) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let path = self.path_for(category);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;

        writer.write_record(R::HEADERS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| StorageError::io(&path, e))?;
        Ok(())
    }

    /// Load all four category files.
    #[must_use]
    pub fn load_accumulated(&self) -> Accumulated {
        Accumulated {
            experts: self.load(Category::Experts),
            grants: self.load(Category::Grants),
            events: self.load(Category::Events),
            reports: self.load(Category::Reports),
        }
    }

    /// Delete every category file and the search cache.
    ///
    /// Returns the number of files removed.
    pub fn clear_accumulated(&self) -> Result<usize, StorageError> {
        let targets = Category::all()
            .iter()
            .map(|c| self.path_for(*c))
            .chain(std::iter::once(self.cache_path()));

        let mut removed = 0;
        for path in targets {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed");
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StorageError::io(&path, e)),
            }
        }

        info!(removed, "Cleared accumulated data");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(title: &str) -> Opportunity {
        Opportunity {
            title: title.to_string(),
            domain: Some("example.org".to_string()),
            description: Some("Funding for climate adaptation".to_string()),
            date_info: Some("Deadline: March 3, 2027".to_string()),
            url: Some(format!("https://example.org/{}", title.replace(' ', "-"))),
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        assert!(store.load::<Opportunity>(Category::Grants).is_empty());
    }

    #[test]
    fn test_append_unique_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path().join("weekly_data"));
        let batch = vec![grant("Grant A"), grant("Grant B")];

        assert_eq!(store.append_unique(Category::Grants, &batch).unwrap(), 2);
        assert_eq!(store.append_unique(Category::Grants, &batch).unwrap(), 0);
        assert_eq!(store.load::<Opportunity>(Category::Grants), batch);
    }

    #[test]
    fn test_append_unique_drops_duplicates_within_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let mut second = grant("Grant A");
        second.domain = Some("other.org".to_string());

        let added = store
            .append_unique(Category::Events, &[grant("Grant A"), second])
            .unwrap();

        assert_eq!(added, 1);
        let rows: Vec<Opportunity> = store.load(Category::Events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].domain.as_deref(), Some("example.org"));
    }

    #[test]
    fn test_empty_append_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());

        let added = store.append_unique::<Expert>(Category::Experts, &[]).unwrap();
        assert_eq!(added, 0);

        let content = std::fs::read_to_string(store.path_for(Category::Experts)).unwrap();
        assert_eq!(content, "Name,Role,Organization,LinkedIn\n");
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        let mut content =
            b"Name,Role,Organization,LinkedIn\nJane Doe,Director,Green Fund,https://linkedin.com/in/jane\n"
                .to_vec();
        content.extend_from_slice(b"Bad \xff Name,Role,Org,#\n");
        std::fs::write(store.path_for(Category::Experts), content).unwrap();

        let rows: Vec<Expert> = store.load(Category::Experts);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Jane Doe");
    }

    #[test]
    fn test_clear_accumulated_removes_files_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        store.append_unique(Category::Grants, &[grant("Grant A")]).unwrap();
        store.append_unique(Category::Reports, &[grant("Report A")]).unwrap();
        std::fs::write(store.cache_path(), "{}").unwrap();
        std::fs::write(store.state_path(), "{}").unwrap();

        assert_eq!(store.clear_accumulated().unwrap(), 3);
        assert!(!store.path_for(Category::Grants).exists());
        assert!(!store.cache_path().exists());
        assert!(store.state_path().exists());
        assert_eq!(store.clear_accumulated().unwrap(), 0);
    }

    #[test]
    fn test_load_accumulated_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::new(dir.path());
        store
            .append_unique(Category::Grants, &[grant("Grant A"), grant("Grant B")])
            .unwrap();

        let data = store.load_accumulated();
        assert_eq!(data.count(Category::Grants), 2);
        assert_eq!(data.count(Category::Experts), 0);
        assert_eq!(data.total(), 2);
    }
}

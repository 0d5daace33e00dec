use crate::migrate::{
    Migration, MigrationSet, MigrationSource, SqlMigrationSource, StateStore, compare_by_id,
};
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

pub type FilterFunction = dyn (Fn(&str) -> bool) + Send + Sync;
pub type SortFunction = dyn (Fn(&Migration, &Migration) -> Ordering) + Send + Sync;

pub(crate) const DEFAULT_MIGRATIONS_DIRECTORY: &str = "migrations";
pub(crate) const DEFAULT_CONCURRENCY: usize = 16;

/// Everything a [`Loader`](crate::migrate::Loader) needs.
/// `set` and `store` are required, the rest have defaults.
pub struct LoaderOptions<'a> {
    pub(crate) set: Option<&'a mut dyn MigrationSet>,
    pub(crate) store: Option<&'a dyn StateStore>,
    pub(crate) source: Box<dyn MigrationSource + 'a>,
    pub(crate) ignore_missing: bool,
    pub(crate) migrations_directory: PathBuf,
    pub(crate) filter_function: Box<FilterFunction>,
    pub(crate) sort_function: Box<SortFunction>,
    pub(crate) concurrency: usize,
}

impl<'a> LoaderOptions<'a> {
    pub fn new() -> Self {
        Self {
            set: None,
            store: None,
            source: Box::new(SqlMigrationSource::new()),
            ignore_missing: false,
            migrations_directory: PathBuf::from(DEFAULT_MIGRATIONS_DIRECTORY),
            filter_function: Box::new(|_| true),
            sort_function: Box::new(compare_by_id),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_set(mut self, set: &'a mut dyn MigrationSet) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_store(mut self, store: &'a dyn StateStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_source<S: MigrationSource + 'a>(mut self, source: S) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Skip persisted entries whose file is gone instead of failing the load.
    pub fn with_ignore_missing(mut self, ignore_missing: bool) -> Self {
        self.ignore_missing = ignore_missing;
        self
    }

    /// Relative paths are resolved against the working directory at load time.
    pub fn with_migrations_directory(mut self, migrations_directory: impl Into<PathBuf>) -> Self {
        self.migrations_directory = migrations_directory.into();
        self
    }

    pub fn with_filter_function<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.filter_function = Box::new(filter);
        self
    }

    pub fn with_sort_function<F>(mut self, sort: F) -> Self
    where
        F: Fn(&Migration, &Migration) -> Ordering + Send + Sync + 'static,
    {
        self.sort_function = Box::new(sort);
        self
    }

    /// Maximum number of migration files loaded at the same time. Values below 1 are raised to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn get_ignore_missing(&self) -> bool {
        self.ignore_missing
    }

    pub fn get_migrations_directory(&self) -> &PathBuf {
        &self.migrations_directory
    }

    pub fn get_concurrency(&self) -> usize {
        self.concurrency
    }
}

impl Debug for LoaderOptions<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("set", &self.set.is_some())
            .field("store", &self.store.is_some())
            .field("ignore_missing", &self.ignore_missing)
            .field("migrations_directory", &self.migrations_directory)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Default for LoaderOptions<'_> {
    fn default() -> Self {
        LoaderOptions::new()
    }
}

#[cfg(test)]
mod tests {
    use super::LoaderOptions;
    use std::path::Path;

    #[test]
    fn defaults() {
        let options = LoaderOptions::default();
        assert!(!options.get_ignore_missing());
        assert_eq!(options.get_migrations_directory(), Path::new("migrations"));
        assert_eq!(options.get_concurrency(), 16);
        assert_eq!(options.source.extension(), "sql");
        assert!((options.filter_function)("anything.sql"));
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let options = LoaderOptions::new().with_concurrency(0);
        assert_eq!(options.get_concurrency(), 1);
    }
}

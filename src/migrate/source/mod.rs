mod embedded;
mod sql;

use crate::migrate::MigrationDefinition;
use crate::AsyncResult;
pub use embedded::{EmbeddedMigration, EmbeddedMigrationSource};
pub use sql::SqlMigrationSource;
use std::path::Path;

/// Turns files found in the migrations directory into migration definitions.
pub trait MigrationSource: Send + Sync {
    /// Extension (without the leading dot) of the files this source reads.
    fn extension(&self) -> &str;

    /// Name of the file expected to hold the migration with the given title.
    fn file_name(&self, title: &str) -> String {
        format!("{}.{}", title, self.extension())
    }

    fn load<'a>(&'a self, path: &'a Path) -> AsyncResult<'a, MigrationDefinition>;
}

impl<S: MigrationSource + ?Sized> MigrationSource for &S {
    fn extension(&self) -> &str {
        (**self).extension()
    }

    fn file_name(&self, title: &str) -> String {
        (**self).file_name(title)
    }

    fn load<'a>(&'a self, path: &'a Path) -> AsyncResult<'a, MigrationDefinition> {
        (**self).load(path)
    }
}

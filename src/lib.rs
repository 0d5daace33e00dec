//! Discovers migration definitions on disk, reconciles them against the
//! persisted execution history and hands them, sorted, to a migration set.
//!
//! ```no_run
//! use creed_migrate::migrate::{load, FileStateStore, LoaderOptions, MigrationList};
//!
//! # async fn run() -> creed_migrate::Result<()> {
//! let store = FileStateStore::new(".migrate");
//! let mut set = MigrationList::new();
//!
//! load(
//!     LoaderOptions::new()
//!         .with_set(&mut set)
//!         .with_store(&store)
//!         .with_migrations_directory("migrations"),
//! )
//! .await?;
//!
//! for migration in set.pending() {
//!     println!("{} is pending", migration.id);
//! }
//! # Ok(())
//! # }
//! ```

extern crate self as creed_migrate;

pub mod error;
pub mod migrate;
mod result;

pub use creed_migrate_macros::embed_migrations;
pub use error::Error;
pub use result::{AsyncResult, Result};

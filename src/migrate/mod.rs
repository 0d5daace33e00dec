mod loader;
mod options;
mod set;
mod source;
pub mod state;

pub use crate::migrate::loader::{Loader, load};
pub use crate::migrate::options::{FilterFunction, LoaderOptions, SortFunction};
pub use crate::migrate::set::{MigrationList, MigrationSet};
pub use crate::migrate::source::{
    EmbeddedMigration, EmbeddedMigrationSource, MigrationSource, SqlMigrationSource,
};
pub use crate::migrate::state::{
    FileStateStore, MemoryStateStore, PersistedMigration, PersistedState, StateStore,
};
use crate::Result;
use chrono::{DateTime, Utc};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Up => "up",
                Self::Down => "down",
            }
        )
    }
}

pub type OpClosure = dyn (Fn() -> Result<()>) + Send + Sync;
pub type DescriptionClosure = dyn (Fn() -> &'static str) + Send + Sync;

/// Handle to one side of a migration. Executing it is up to the runner.
#[derive(Clone)]
pub enum Operation {
    /// Rust code compiled into the binary.
    Callback(Arc<OpClosure>),
    /// A SQL script read from disk.
    Script(String),
}

impl Operation {
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(func))
    }

    pub fn script(&self) -> Option<&str> {
        match self {
            Self::Script(sql) => Some(sql.as_str()),
            Self::Callback(_) => None,
        }
    }
}

impl Debug for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback"),
            Self::Script(sql) => f.debug_tuple("Script").field(sql).finish(),
        }
    }
}

/// What a migration source yields for a single file.
#[derive(Clone, Debug)]
pub struct MigrationDefinition {
    pub up: Operation,
    pub down: Operation,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Migration {
    pub id: String,
    pub up: Operation,
    pub down: Operation,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Migration {
    pub fn new(id: impl Into<String>, definition: MigrationDefinition) -> Self {
        Self {
            id: id.into(),
            up: definition.up,
            down: definition.down,
            description: definition.description,
            timestamp: None,
        }
    }

    pub fn operation(&self, direction: Direction) -> &Operation {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    /// Whether persisted state recorded this migration as run.
    pub fn has_run(&self) -> bool {
        self.timestamp.is_some()
    }
}

/// Default ordering: lexicographic by id.
pub fn compare_by_id(a: &Migration, b: &Migration) -> std::cmp::Ordering {
    a.id.cmp(&b.id)
}

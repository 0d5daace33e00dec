use crate::migrate::Migration;
use chrono::{DateTime, Utc};

/// Receives the result of a load.
pub trait MigrationSet: Send {
    fn set_last_run(&mut self, last_run: Option<DateTime<Utc>>);
    fn add_migration(&mut self, migration: Migration);
}

/// A plain ordered collection of loaded migrations.
#[derive(Clone, Debug, Default)]
pub struct MigrationList {
    last_run: Option<DateTime<Utc>>,
    migrations: Vec<Migration>,
}

impl MigrationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    pub fn get(&self, id: &str) -> Option<&Migration> {
        self.migrations.iter().find(|m| m.id == id)
    }

    /// Migrations with no recorded run, in registration order.
    pub fn pending(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.iter().filter(|m| !m.has_run())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }
}

impl MigrationSet for MigrationList {
    fn set_last_run(&mut self, last_run: Option<DateTime<Utc>>) {
        self.last_run = last_run;
    }

    fn add_migration(&mut self, migration: Migration) {
        self.migrations.push(migration);
    }
}

#[cfg(test)]
mod tests {
    use super::{MigrationList, MigrationSet};
    use crate::migrate::{Migration, MigrationDefinition, Operation};
    use chrono::Utc;

    fn migration(id: &str) -> Migration {
        Migration::new(
            id,
            MigrationDefinition {
                up: Operation::Script(String::new()),
                down: Operation::Script(String::new()),
                description: None,
            },
        )
    }

    #[test]
    fn keeps_registration_order() {
        let now = Utc::now();
        let mut list = MigrationList::new();
        list.set_last_run(Some(now));

        let mut first = migration("002");
        first.timestamp = Some(now);
        list.add_migration(first);
        list.add_migration(migration("001"));

        assert_eq!(list.last_run(), Some(now));
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.migrations().iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["002", "001"]
        );
        assert_eq!(
            list.pending().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["001"]
        );
        assert!(list.get("002").is_some_and(|m| m.has_run()));
        assert!(list.get("003").is_none());
    }
}

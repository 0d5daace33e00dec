use crate::error::Error;
use crate::migrate::source::MigrationSource;
use crate::migrate::{DescriptionClosure, MigrationDefinition, OpClosure, Operation};
use crate::AsyncResult;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

/// A migration compiled into the binary. Usually generated by
/// [`embed_migrations!`](crate::embed_migrations).
#[derive(Clone)]
pub struct EmbeddedMigration {
    pub file_name: &'static str,
    pub up: &'static OpClosure,
    pub down: &'static OpClosure,
    pub description: Option<&'static DescriptionClosure>,
}

/// Resolves directory entries against a table of migrations known at build time.
/// The directory on disk is still what decides which migrations exist.
#[derive(Clone)]
pub struct EmbeddedMigrationSource {
    migrations: Cow<'static, [EmbeddedMigration]>,
}

impl EmbeddedMigrationSource {
    pub const fn new(migrations: Cow<'static, [EmbeddedMigration]>) -> Self {
        Self { migrations }
    }

    pub fn migrations(&self) -> &[EmbeddedMigration] {
        &self.migrations
    }

    fn find(&self, file_name: &str) -> Option<&EmbeddedMigration> {
        self.migrations.iter().find(|m| m.file_name == file_name)
    }
}

impl MigrationSource for EmbeddedMigrationSource {
    fn extension(&self) -> &str {
        "rs"
    }

    fn load<'a>(&'a self, path: &'a Path) -> AsyncResult<'a, MigrationDefinition> {
        Box::pin(async move {
            let migration = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| self.find(name))
                .ok_or_else(|| {
                    Error::definition_load(format!(
                        "{} has not been embedded into this build",
                        path.display()
                    ))
                })?;

            let up: Arc<OpClosure> = Arc::new(migration.up);
            let down: Arc<OpClosure> = Arc::new(migration.down);

            Ok(MigrationDefinition {
                up: Operation::Callback(up),
                down: Operation::Callback(down),
                description: migration.description.map(|d| d().to_string()),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{EmbeddedMigration, EmbeddedMigrationSource};
    use crate::error::{Error, ErrorKind};
    use crate::migrate::{MigrationSource, Operation};
    use crate::Result;
    use std::borrow::Cow;
    use std::path::Path;

    fn up() -> Result<()> {
        Ok(())
    }

    fn down() -> Result<()> {
        Err(Error::from("irreversible"))
    }

    fn description() -> &'static str {
        "create users table"
    }

    const SOURCE: EmbeddedMigrationSource = EmbeddedMigrationSource::new(Cow::Borrowed(&[
        EmbeddedMigration {
            file_name: "001-init.rs",
            up: &up,
            down: &down,
            description: Some(&description),
        },
        EmbeddedMigration {
            file_name: "002-add-col.rs",
            up: &up,
            down: &up,
            description: None,
        },
    ]));

    #[tokio::test]
    async fn loads_embedded_definition() {
        let definition = SOURCE.load(Path::new("/srv/migrations/001-init.rs")).await.unwrap();
        assert_eq!(definition.description.as_deref(), Some("create users table"));

        let Operation::Callback(up) = definition.up else {
            panic!("expected a callback");
        };
        assert!(up().is_ok());

        let Operation::Callback(down) = definition.down else {
            panic!("expected a callback");
        };
        assert_eq!(down().unwrap_err().to_string(), "irreversible");

        let definition = SOURCE.load(Path::new("002-add-col.rs")).await.unwrap();
        assert!(definition.description.is_none());
        assert_eq!(SOURCE.migrations().len(), 2);
    }

    #[tokio::test]
    async fn unknown_files_are_definition_errors() {
        let error = SOURCE.load(Path::new("003-unknown.rs")).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DefinitionLoadError);
        assert_eq!(SOURCE.file_name("003-unknown"), "003-unknown.rs");
    }
}

use crate::error::Error;
use crate::migrate::source::MigrationSource;
use crate::migrate::{MigrationDefinition, Operation};
use crate::{AsyncResult, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref SECTION_MARKER: Regex =
        Regex::new(r"(?m)^[ \t]*--[ \t]*migrate:(up|down)[ \t]*\r?$")
            .expect("invalid section marker regex");
    static ref DESCRIPTION: Regex =
        Regex::new(r"(?m)^[ \t]*--[ \t]*description:[ \t]*(.*?)[ \t]*\r?$")
            .expect("invalid description regex");
}

/// Reads plain SQL migration files:
///
/// ```sql
/// -- description: create users table
///
/// -- migrate:up
/// CREATE TABLE users (id INT PRIMARY KEY);
///
/// -- migrate:down
/// DROP TABLE users;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SqlMigrationSource;

impl SqlMigrationSource {
    pub fn new() -> Self {
        Self
    }
}

impl MigrationSource for SqlMigrationSource {
    fn extension(&self) -> &str {
        "sql"
    }

    fn load<'a>(&'a self, path: &'a Path) -> AsyncResult<'a, MigrationDefinition> {
        Box::pin(async move {
            let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                Error::definition_load(format!(
                    "Unable to read migration file {}: {}",
                    path.display(),
                    e
                ))
            })?;

            parse_definition(&contents).map_err(|e| {
                Error::definition_load(format!("{}: {}", path.display(), e))
            })
        })
    }
}

fn parse_definition(contents: &str) -> Result<MigrationDefinition> {
    let markers = SECTION_MARKER
        .captures_iter(contents)
        .map(|caps| {
            let whole = caps.get_match();
            let kind = caps.get(1).map_or("", |m| m.as_str());
            (kind, whole.start(), whole.end())
        })
        .collect::<Vec<_>>();

    let mut up = None;
    let mut down = None;
    for (idx, (kind, _, body_start)) in markers.iter().enumerate() {
        let body_end = markers
            .get(idx + 1)
            .map_or(contents.len(), |(_, start, _)| *start);
        let body = contents[*body_start..body_end].trim().to_string();

        let slot = if *kind == "up" { &mut up } else { &mut down };
        if slot.replace(body).is_some() {
            return Err(Error::definition_load(format!(
                "duplicate \"-- migrate:{}\" section",
                kind
            )));
        }
    }

    let Some(up) = up else {
        return Err(Error::definition_load(
            "missing \"-- migrate:up\" section",
        ));
    };

    // description is only read from the header, before the first section
    let header_end = markers.first().map_or(contents.len(), |(_, start, _)| *start);
    let description = DESCRIPTION
        .captures(&contents[..header_end])
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|d| !d.is_empty());

    Ok(MigrationDefinition {
        up: Operation::Script(up),
        down: Operation::Script(down.unwrap_or_default()),
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::{SqlMigrationSource, parse_definition};
    use crate::error::ErrorKind;
    use crate::migrate::MigrationSource;

    #[test]
    fn parses_sections_and_description() {
        let definition = parse_definition(
            "-- description: create users table\n\
             \n\
             -- migrate:up\n\
             CREATE TABLE users (id INT PRIMARY KEY);\n\
             \n\
             -- migrate:down\n\
             DROP TABLE users;\n",
        )
        .unwrap();

        assert_eq!(
            definition.description.as_deref(),
            Some("create users table")
        );
        assert_eq!(
            definition.up.script(),
            Some("CREATE TABLE users (id INT PRIMARY KEY);")
        );
        assert_eq!(definition.down.script(), Some("DROP TABLE users;"));
    }

    #[test]
    fn down_section_is_optional() {
        let definition = parse_definition("-- migrate:up\nSELECT 1;\n").unwrap();
        assert_eq!(definition.up.script(), Some("SELECT 1;"));
        assert_eq!(definition.down.script(), Some(""));
        assert!(definition.description.is_none());
    }

    #[test]
    fn sections_can_come_in_any_order() {
        let definition =
            parse_definition("-- migrate:down\r\nDROP TABLE t;\r\n-- migrate:up\r\nCREATE TABLE t (id INT);\r\n")
                .unwrap();
        assert_eq!(definition.up.script(), Some("CREATE TABLE t (id INT);"));
        assert_eq!(definition.down.script(), Some("DROP TABLE t;"));
    }

    #[test]
    fn up_section_is_required() {
        let error = parse_definition("-- migrate:down\nDROP TABLE t;\n").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DefinitionLoadError);
        assert!(error.to_string().contains("migrate:up"));
    }

    #[test]
    fn duplicate_sections_are_rejected() {
        let error =
            parse_definition("-- migrate:up\nSELECT 1;\n-- migrate:up\nSELECT 2;\n").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DefinitionLoadError);
    }

    #[tokio::test]
    async fn load_reports_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = SqlMigrationSource::new();
        let path = dir.path().join("001-init.sql");

        let error = source.load(&path).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DefinitionLoadError);
        assert!(error.to_string().contains("001-init.sql"));

        std::fs::write(&path, "-- migrate:up\nSELECT 1;\n").unwrap();
        let definition = source.load(&path).await.unwrap();
        assert_eq!(definition.up.script(), Some("SELECT 1;"));
        assert_eq!(source.file_name("001-init"), "001-init.sql");
    }
}

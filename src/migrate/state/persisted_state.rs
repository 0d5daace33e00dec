use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PersistedMigration {
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl PersistedMigration {
    pub fn new(title: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            timestamp,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub migrations: Vec<PersistedMigration>,
}

impl PersistedState {
    pub fn new(last_run: Option<DateTime<Utc>>, migrations: Vec<PersistedMigration>) -> Self {
        Self {
            last_run,
            migrations,
        }
    }

    pub fn first(&self) -> Option<&PersistedMigration> {
        self.migrations.first()
    }

    pub fn last(&self) -> Option<&PersistedMigration> {
        self.migrations.last()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn has_migration(&self, title: &str) -> bool {
        self.migrations.iter().any(|m| m.title == title)
    }

    pub fn get_migration(&self, title: &str) -> Option<&PersistedMigration> {
        self.migrations.iter().find(|m| m.title == title)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<PersistedMigration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PersistedMigration>>::deserialize(deserializer)?.unwrap_or_default())
}

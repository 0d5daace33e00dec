use crate::error::Error;
use crate::migrate::options::{FilterFunction, LoaderOptions, SortFunction};
use crate::migrate::{Migration, MigrationSet, MigrationSource, PersistedState, StateStore};
use crate::Result;
use futures::{StreamExt, TryStreamExt, stream};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reads the migrations directory, reconciles it against the persisted state
/// and registers the result, sorted, into a [`MigrationSet`].
///
/// A loader is consumed by [`Loader::load`]; nothing is kept across loads.
pub struct Loader<'a> {
    set: &'a mut dyn MigrationSet,
    store: &'a dyn StateStore,
    source: Box<dyn MigrationSource + 'a>,
    ignore_missing: bool,
    migrations_directory: PathBuf,
    filter_function: Box<FilterFunction>,
    sort_function: Box<SortFunction>,
    concurrency: usize,
}

impl<'a> TryFrom<LoaderOptions<'a>> for Loader<'a> {
    type Error = Error;

    /// Fails without touching the store or the filesystem when `set` or `store` is missing.
    fn try_from(options: LoaderOptions<'a>) -> Result<Self> {
        let LoaderOptions {
            set,
            store,
            source,
            ignore_missing,
            migrations_directory,
            filter_function,
            sort_function,
            concurrency,
        } = options;

        let Some(set) = set else {
            return Err(Error::missing_set());
        };
        let Some(store) = store else {
            return Err(Error::missing_store());
        };

        Ok(Self {
            set,
            store,
            source,
            ignore_missing,
            migrations_directory,
            filter_function,
            sort_function,
            concurrency: concurrency.max(1),
        })
    }
}

/// Validates `options` and runs a full load.
pub async fn load(options: LoaderOptions<'_>) -> Result<()> {
    Loader::try_from(options)?.load().await
}

impl Loader<'_> {
    pub async fn load(self) -> Result<()> {
        let Loader {
            set,
            store,
            source,
            ignore_missing,
            migrations_directory,
            filter_function,
            sort_function,
            concurrency,
        } = self;

        let state = store.load().await.map_err(Error::store_load)?;
        set.set_last_run(state.last_run);

        let directory = std::path::absolute(&migrations_directory).map_err(|e| {
            Error::directory_read(format!(
                "Unable to resolve migrations directory {}: {}",
                migrations_directory.display(),
                e
            ))
        })?;
        info!(target: "creed::migrate", "Loading migrations from {}", directory.display());

        let file_names = read_directory(&directory)
            .await?
            .into_iter()
            .filter(|file_name| filter_function(file_name.as_str()))
            .collect::<Vec<_>>();

        let mut migrations =
            build_migrations(&*source, &directory, file_names, concurrency).await?;
        reconcile(
            &state,
            &mut migrations,
            &*source,
            &directory,
            ignore_missing,
        )
        .await?;

        let mut migrations = migrations.into_sorted_vec(&*sort_function);
        let total = migrations.len();
        let pending = migrations.iter().filter(|m| !m.has_run()).count();
        for migration in migrations.drain(..) {
            set.add_migration(migration);
        }

        info!(target: "creed::migrate", "Loaded {} migrations, {} pending", total, pending);

        Ok(())
    }
}

/// Migrations of a single load, indexed by id.
struct MigrationMap {
    migrations: Vec<Migration>,
    index: HashMap<String, (usize, String)>,
}

impl MigrationMap {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            migrations: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, file_name: &str, migration: Migration) -> Result<()> {
        if let Some((_, existing)) = self.index.get(&migration.id) {
            return Err(Error::definition_load(format!(
                "{} and {} both define migration \"{}\"",
                existing, file_name, migration.id
            )));
        }

        self.index.insert(
            migration.id.clone(),
            (self.migrations.len(), file_name.to_string()),
        );
        self.migrations.push(migration);

        Ok(())
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Migration> {
        self.index
            .get(id)
            .map(|(idx, _)| &mut self.migrations[*idx])
    }

    fn into_sorted_vec(self, sort_function: &SortFunction) -> Vec<Migration> {
        let mut migrations = self.migrations;
        migrations.sort_by(|a, b| sort_function(a, b));
        migrations
    }
}

async fn read_directory(directory: &Path) -> Result<Vec<String>> {
    let read_error = |e: std::io::Error| {
        Error::directory_read(format!(
            "Unable to read migrations directory {}: {}",
            directory.display(),
            e
        ))
    };

    let mut entries = tokio::fs::read_dir(directory).await.map_err(read_error)?;
    let mut file_names = vec![];
    while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
        file_names.push(entry.file_name().to_string_lossy().into_owned());
    }

    Ok(file_names)
}

fn migration_id(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}

async fn build_migrations(
    source: &dyn MigrationSource,
    directory: &Path,
    file_names: Vec<String>,
    concurrency: usize,
) -> Result<MigrationMap> {
    let definitions = stream::iter(file_names.into_iter().map(|file_name| async move {
        let path = directory.join(&file_name);
        debug!(target: "creed::migrate", "Loading migration {}", path.display());

        let definition = source.load(&path).await.map_err(Error::source_failure)?;
        Ok::<_, Error>((file_name, definition))
    }))
    .buffered(concurrency)
    .try_collect::<Vec<_>>()
    .await?;

    let mut migrations = MigrationMap::with_capacity(definitions.len());
    for (file_name, definition) in definitions {
        migrations.insert(&file_name, Migration::new(migration_id(&file_name), definition))?;
    }

    Ok(migrations)
}

/// Walks the persisted state in order, stopping at the first entry whose file is gone.
async fn reconcile(
    state: &PersistedState,
    migrations: &mut MigrationMap,
    source: &dyn MigrationSource,
    directory: &Path,
    ignore_missing: bool,
) -> Result<()> {
    for persisted in state.migrations.iter() {
        let path = directory.join(source.file_name(&persisted.title));
        if !matches!(tokio::fs::try_exists(&path).await, Ok(true)) {
            if ignore_missing {
                warn!(target: "creed::migrate", "Skipping {}: {} does not exist", persisted.title, path.display());
                continue;
            }

            error!(target: "creed::migrate", "Migration file {} for {} does not exist", path.display(), persisted.title);
            return Err(Error::missing_migration_file(&persisted.title));
        }

        if let Some(migration) = migrations.get_mut(&persisted.title) {
            debug!(target: "creed::migrate", "Migration {} last run at {}", persisted.title, persisted.timestamp);
            migration.timestamp = Some(persisted.timestamp);
        }
    }

    Ok(())
}

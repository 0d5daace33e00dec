use std::backtrace::Backtrace;
use std::fmt::{Debug, Display, Formatter};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    ConfigurationError = 1,
    StoreLoadError = 2,
    DirectoryReadError = 3,
    DefinitionLoadError = 4,
    MissingMigrationFile = 5,

    UnknownError = -1,
}

pub struct Error {
    kind: ErrorKind,
    inner: Box<dyn std::error::Error + Send + Sync>,
    backtrace: Backtrace,
}

pub struct StdError(Error);

impl Display for StdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0.to_string(), f)
    }
}

impl Debug for StdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0.to_string(), f)
    }
}

impl std::error::Error for StdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.inner.as_ref())
    }
}

impl From<Error> for StdError {
    fn from(e: Error) -> Self {
        StdError(e)
    }
}

impl Error {
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind,
            inner: error.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    pub fn missing_set() -> Self {
        Self::new(
            ErrorKind::ConfigurationError,
            "set is required for loading migrations",
        )
    }

    pub fn missing_store() -> Self {
        Self::new(
            ErrorKind::ConfigurationError,
            "store is required for loading migrations",
        )
    }

    /// Wraps a failure raised while retrieving the persisted state.
    /// Errors which already carry this kind are passed through untouched.
    pub fn store_load(error: Error) -> Self {
        if error.kind == ErrorKind::StoreLoadError {
            error
        } else {
            Self::new(ErrorKind::StoreLoadError, StdError(error))
        }
    }

    pub fn directory_read<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::DirectoryReadError, error)
    }

    pub fn definition_load<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::DefinitionLoadError, error)
    }

    /// Wraps a failure raised by a migration source.
    pub fn source_failure(error: Error) -> Self {
        if error.kind == ErrorKind::DefinitionLoadError {
            error
        } else {
            Self::new(ErrorKind::DefinitionLoadError, StdError(error))
        }
    }

    pub fn missing_migration_file<T>(title: T) -> Self
    where
        T: Display,
    {
        Self::new(
            ErrorKind::MissingMigrationFile,
            format!("Missing migration file: {}", title),
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}: {}\nBacktrace:\n{}",
            self.kind, self.inner, self.backtrace
        )
    }
}

impl<T> From<T> for Error
where
    T: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn from(err: T) -> Self {
        crate::error::Error::new(ErrorKind::UnknownError, err)
    }
}

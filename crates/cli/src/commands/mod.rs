//! Command implementations.

pub mod profile;
pub mod tasks;
pub mod users;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use homecare_web::services::auth::AuthError;
use homecare_web::services::registry::RegistryError;
use homecare_web::services::tasks::TaskError;
use homecare_web::store::{FileStore, LocalStore, StoreError};

const DEFAULT_DATA_DIR: &str = "data";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tasks(#[from] TaskError),

    #[error(transparent)]
    Users(#[from] RegistryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A flag value that does not parse.
    #[error("Invalid {0}: {1}")]
    InvalidArgument(&'static str, String),
}

/// Open `profile` in the data directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the profile name
/// is not a valid key.
pub fn open_store(data_dir: Option<PathBuf>, profile: &str) -> Result<LocalStore, CliError> {
    let dir = data_dir
        .or_else(|| std::env::var_os("HOMECARE_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    tracing::debug!(data_dir = %dir.display(), profile, "Opening store");
    let backend = FileStore::open(dir)?;
    Ok(LocalStore::new(Arc::new(backend), profile)?)
}

/// Parse a flag value, naming the flag in the error.
fn parse_arg<T>(name: &'static str, raw: &str) -> Result<T, CliError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| CliError::InvalidArgument(name, e.to_string()))
}

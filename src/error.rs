use thiserror::Error;

use crate::config::ConfigError;
use crate::output::OutputError;
use crate::reload::ReloadError;
use crate::resolver::ResolveError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("config written but not applied: {0}")]
    Reload(#[from] ReloadError),
    #[error("building HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl Error {
    /// Process exit code, reload failures are told apart from generation failures
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Reload(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// Application errors plus failures writing command output.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot write {what} to stdout")]
    Output {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    pub fn output(what: &'static str, source: std::io::Error) -> Self {
        Self::Output { what, source }
    }
}

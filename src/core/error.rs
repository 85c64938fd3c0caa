use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Missing Configuration For {0} and {1}")]
    MissingConfiguration(&'static str, &'static str),

    #[error("Is Not Async Configuration")]
    NotAsyncConfiguration,

    #[error("Is Not Sync Configuration")]
    NotSyncConfiguration,

    #[error("Configuration for {0} and {1} already exists")]
    DuplicateMapping(&'static str, &'static str),

    #[error("Unsupported mapping shape: {0}")]
    UnsupportedMappingShape(String),

    #[error("Member '{0}' not found on {1}")]
    UnknownMember(String, &'static str),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Lock error: {0}")]
    LockError(String),

    /// Failure raised by a registered conversion. The original error is kept
    /// as-is and can be recovered with `downcast_ref`.
    #[error(transparent)]
    Conversion(#[from] anyhow::Error),
}

impl MapperError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedMappingShape(reason.into())
    }

    /// Original failure of a conversion callable, if this is one.
    pub fn conversion_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Conversion(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;

impl<T> From<std::sync::PoisonError<T>> for MapperError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

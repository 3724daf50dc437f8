use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Fetch(#[from] permitstream_core::FetchError),

    #[error(transparent)]
    Store(#[from] permitstream_core::StoreError),

    #[error("run produced no records for any source")]
    RunProducedNothing,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Fetch(_) | Self::Store(_) => 2,
            Self::RunProducedNothing => 5,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}

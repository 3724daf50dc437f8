use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot format error at {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid source id '{0}': expected a lowercase slug")]
    InvalidSourceId(String),

    #[error("invalid day '{0}': expected YYYY-MM-DD")]
    InvalidDay(String),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn format(path: &std::path::Path, source: csv::Error) -> Self {
        Self::Format {
            path: path.display().to_string(),
            source,
        }
    }
}

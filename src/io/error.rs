use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details}")]
    Parse { format: Format, details: String },

    #[error("failed to serialize {format} data: {details}")]
    Serialize { format: Format, details: String },

    #[error("cannot infer a format from '{0}'; expected a .toml or .json file")]
    UnknownFormat(String),
}

impl Error {
    pub fn parse(format: Format, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            details: details.into(),
        }
    }

    pub fn serialize(format: Format, details: impl Into<String>) -> Self {
        Self::Serialize {
            format,
            details: details.into(),
        }
    }
}

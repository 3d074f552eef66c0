use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::Side;

/// Errors raised while accepting or reading an input file.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("File not supported! '{name}' has media type '{media_type}'")]
    UnsupportedMediaType { name: String, media_type: String },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No {side} file is loaded")]
    NotLoaded { side: Side },

    #[error("Option index {index} is out of range for a list of {len}")]
    OptionOutOfRange { index: usize, len: usize },
}

/// Reasons a form cannot be turned into a submission yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Please specify an origin file.")]
    MissingOriginFile,

    #[error("Please specify a destination file.")]
    MissingDestinationFile,

    #[error("Please check at least one of 'Access measures' and 'Coverage measures.'")]
    NoMeasureSelected,
}

impl SubmissionError {
    pub fn missing_file(side: Side) -> Self {
        match side {
            Side::Origin => Self::MissingOriginFile,
            Side::Destination => Self::MissingDestinationFile,
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file type '{extension}': {path}")]
    UnsupportedFormat { path: String, extension: String },

    #[error("failed to extract text from {path}: {details}")]
    Extraction { path: String, details: String },

    #[error("invalid skills dictionary: {0}")]
    SkillsDictionary(String),

    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ScreenError {
    pub(crate) fn extraction(path: &std::path::Path, details: impl ToString) -> Self {
        ScreenError::Extraction {
            path: path.display().to_string(),
            details: details.to_string(),
        }
    }

    /// True when the failure was caused by the submitted documents rather
    /// than by the host.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ScreenError::UnsupportedFormat { .. }
                | ScreenError::Extraction { .. }
                | ScreenError::SkillsDictionary(_)
                | ScreenError::InvalidArgument(_)
        )
    }
}

pub type Result<T, E = ScreenError> = std::result::Result<T, E>;

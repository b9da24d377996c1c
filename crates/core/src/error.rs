//! Error types for PowerPoint to PDF conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting presentations.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure outside of a single conversion.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input directory does not exist or is not a directory.
    #[error("Input folder does not exist: {}", .0.display())]
    MissingInputDirectory(PathBuf),

    /// The input file does not exist or is not a regular file.
    #[error("Input file does not exist: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// The file is not a PPT/PPTX presentation.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// No usable conversion engine was found.
    #[error("{dependency} not found. {remedy}")]
    NoEngineAvailable {
        /// The missing external software.
        dependency: String,
        /// How to make it available.
        remedy: String,
    },

    /// A single file failed to convert.
    #[error("Error converting {}: {reason}", .file.display())]
    Conversion {
        /// Source presentation.
        file: PathBuf,
        /// Engine-reported reason.
        reason: String,
    },

    /// The engine session could not be started or shut down.
    #[error("Engine session error: {0}")]
    Session(String),
}

impl Error {
    /// Build a per-file conversion failure.
    pub fn conversion(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Conversion {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error should abort the whole run rather than a single file.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Conversion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_engine_message_names_remedy() {
        let err = Error::NoEngineAvailable {
            dependency: "LibreOffice".into(),
            remedy: "Install it.".into(),
        };
        assert_eq!(err.to_string(), "LibreOffice not found. Install it.");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_conversion_is_not_fatal() {
        let err = Error::conversion("deck.pptx", "boom");
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Error converting deck.pptx: boom");
    }
}

//! Fatal decoding errors.

use std::io;

use thiserror::Error;

use crate::error::ErrorCode;

/// An error that prevents a package from being decoded at all.
///
/// Anything narrower than the whole document (a page, a shape, an image)
/// is reported as a [`Diagnostic`](crate::error::Diagnostic) instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open package `{path}`: {source}")]
    Open { path: String, source: io::Error },

    #[error("not a readable package archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("missing document descriptor `{0}`")]
    MissingDescriptor(String),

    #[error("malformed document descriptor `{part}`: {reason}")]
    MalformedDescriptor { part: String, reason: String },
}

impl DecodeError {
    /// The diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Open { .. } | Self::Archive(_) => ErrorCode::E001,
            Self::MissingDescriptor(_) => ErrorCode::E002,
            Self::MalformedDescriptor { .. } => ErrorCode::E003,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_codes() {
        let err = DecodeError::MissingDescriptor("visio/document.xml".to_string());
        assert_eq!(err.code(), ErrorCode::E002);

        let err = DecodeError::Open {
            path: "missing.vsdx".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.code(), ErrorCode::E001);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::MalformedDescriptor {
            part: "visio/document.xml".to_string(),
            reason: "unexpected end of stream".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "malformed document descriptor `visio/document.xml`: unexpected end of stream"
        );
    }
}

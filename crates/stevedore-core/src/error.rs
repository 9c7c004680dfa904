//! Error types for stevedore-core.

use thiserror::Error;

/// Result type for stevedore-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or running a job archive driver.
#[derive(Debug, Error)]
pub enum Error {
    /// No driver was named and no unit in the archive exposes the entry signature.
    #[error("no driver specified: no unit in the archive exposes the entry signature")]
    NoDriverSpecified,

    /// No driver was named and more than one unit exposes the entry signature.
    #[error("multiple driver candidates: {count} units expose the entry signature")]
    MultipleDriverCandidates { count: usize },

    /// An explicitly requested driver unit failed to load.
    #[error("driver unit {name} could not be loaded: {reason}")]
    ExplicitNotFound { name: String, reason: String },

    /// The manifest names an entry point that failed to load.
    #[error("manifest entry point {name} could not be loaded: {reason}")]
    ManifestLoadFailed { name: String, reason: String },

    /// The archive is malformed or an entry could not be read.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to load a dynamic library.
    #[error("failed to load library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// The named unit exists in no location of the isolation boundary.
    #[error("unit {0} not found in the isolation boundary")]
    UnitNotFound(String),

    /// The command-line argument string could not be split.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The driver ran and failed, or could not be invoked.
    #[error("execution error: {0}")]
    Execution(String),

    /// The job was cancelled before or during execution.
    #[error("execution aborted")]
    Aborted,
}

impl Error {
    /// Stable reason code for the caller boundary.
    ///
    /// Resolution and load failures map onto the fixed code set; everything
    /// lower-level reports as `IOFailure`.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Error::NoDriverSpecified => "NoDriverSpecified",
            Error::MultipleDriverCandidates { .. } => "MultipleDriverCandidates",
            Error::ExplicitNotFound { .. } => "ExplicitNotFound",
            Error::ManifestLoadFailed { .. } => "ManifestLoadFailed",
            Error::Archive(_) | Error::Io(_) | Error::LibraryLoad(_) | Error::UnitNotFound(_) => {
                "IOFailure"
            }
            Error::InvalidArguments(_) => "InvalidArguments",
            Error::Execution(_) => "ExecutionFailed",
            Error::Aborted => "Aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(Error::NoDriverSpecified.reason_code(), "NoDriverSpecified");
        assert_eq!(
            Error::MultipleDriverCandidates { count: 2 }.reason_code(),
            "MultipleDriverCandidates"
        );
        assert_eq!(
            Error::UnitNotFound("com.acme.Driver".to_string()).reason_code(),
            "IOFailure"
        );
    }
}

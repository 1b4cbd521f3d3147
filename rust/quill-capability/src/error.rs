use thiserror::Error;

/// The common error type used by this crate
///
/// Denial is never an error: an action the principal may not perform
/// resolves to [`crate::DO_NOT_ALLOW`]. The variants below describe
/// programmer errors and collaborator failures only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuillCapabilityError {
    /// A rule that structurally needs a positional argument received none
    #[error("Action `{action}` requires an argument at position {position}")]
    MissingArgument {
        /// The action being resolved
        action: String,
        /// Zero based position of the missing argument
        position: usize,
    },

    /// A role was required to exist but is not part of the registry
    #[error("Unknown role `{0}`")]
    UnknownRole(String),

    /// The data access collaborator failed
    #[error("Data access failed: {0}")]
    DataAccess(String),

    /// A registered capability filter failed
    #[error("Capability filter failed while resolving `{action}`: {message}")]
    Filter {
        /// The action being filtered
        action: String,
        /// Description reported by the filter
        message: String,
    },

    /// Engine settings could not be parsed
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl From<serde_json::Error> for QuillCapabilityError {
    fn from(error: serde_json::Error) -> Self {
        QuillCapabilityError::Settings(error.to_string())
    }
}

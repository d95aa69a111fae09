use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A precomputed identity failed hex or length validation.
    #[error("malformed identifier {value:?}: {reason}")]
    MalformedIdentifier { value: String, reason: String },

    #[error("unknown digest configuration: {0}")]
    UnknownDigest(String),
}

impl TypeError {
    pub(crate) fn malformed(value: &str, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

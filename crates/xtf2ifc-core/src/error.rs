use crate::model::EntityKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Conversion failures and the non-fatal findings recorded along the way.
///
/// `MalformedDocument`, `DegenerateOrigin`, `AuthoringFailure`, `InvalidConfig`
/// and `Io` abort the document. `UnresolvedReference` and `InvalidNumericValue`
/// never abort; they are turned into report warnings via [`ConvertError::code`].
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("unresolved reference: {kind} '{id}' {reason}")]
    UnresolvedReference {
        kind: EntityKind,
        id: String,
        reason: String,
    },

    #[error("invalid numeric value for {field} of '{id}': {value:?}")]
    InvalidNumericValue {
        field: String,
        id: String,
        value: String,
    },

    #[error("degenerate global origin ({x}, {y}, {z}): no positioned geometry")]
    DegenerateOrigin { x: f64, y: f64, z: f64 },

    #[error("authoring failure: {0}")]
    AuthoringFailure(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::MalformedDocument(_) => "malformed_document",
            ConvertError::UnresolvedReference { .. } => "unresolved_reference",
            ConvertError::InvalidNumericValue { .. } => "invalid_numeric_value",
            ConvertError::DegenerateOrigin { .. } => "degenerate_origin",
            ConvertError::AuthoringFailure(_) => "authoring_failure",
            ConvertError::InvalidConfig(_) => "invalid_config",
            ConvertError::Io(_) => "io",
        }
    }
}

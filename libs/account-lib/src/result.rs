use serde::{Deserialize, Serialize};

/// A business-rule violation caught before any persistence attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// A rejection reported by the identity provider after a persistence
/// attempt, carried verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderError {
    pub code: String,
    pub description: String,
}

/// Uniform contract returned by every mutating user operation. At most one
/// of the error collections is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub succeeded: bool,
    pub field_errors: Vec<FieldError>,
    pub provider_errors: Vec<ProviderError>,
}

impl OperationResult {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            field_errors: vec![],
            provider_errors: vec![],
        }
    }

    pub fn invalid(field_errors: Vec<FieldError>) -> Self {
        Self {
            succeeded: false,
            field_errors,
            provider_errors: vec![],
        }
    }

    pub fn rejected(provider_errors: Vec<ProviderError>) -> Self {
        Self {
            succeeded: false,
            field_errors: vec![],
            provider_errors,
        }
    }
}

/// Result of a delete, paired with the removed account's email so the
/// caller can build its confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedUser {
    pub email: String,
    pub result: OperationResult,
}

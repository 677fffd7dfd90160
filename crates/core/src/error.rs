use crate::types::DbId;

/// Domain error shared by every layer.
///
/// The HTTP layer maps each variant to a status code; repositories and pure
/// rule modules only ever produce these.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness or referential clash (duplicate name, resource in use).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request is well-formed but violates a business rule
    /// (invalid lifecycle transition, editing a paid payroll, ...).
    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(crate::validation::describe(&errors))
    }
}

//! Error taxonomy for the CDR patient core.
//!
//! Every fallible operation in this crate returns [`CdrResult`]. The variants
//! map one-to-one onto the categories the transport layer needs to
//! distinguish: missing references, invariant conflicts, bad input,
//! data-integrity faults found at read time, and upstream service failures.

#[derive(Debug, thiserror::Error)]
pub enum CdrError {
    #[error("{entity} not found with {field}: {value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    Validation(String),

    /// An invariant the store is supposed to enforce was found violated at
    /// read time. Never resolved silently; surfaced so the operator can
    /// repair the data.
    #[error("data integrity violation: {0}")]
    Integrity(String),

    /// A required call to an external collaborator failed. Only fatal on the
    /// patient-void path; read paths degrade instead of raising this.
    #[error("upstream service failure: {0}")]
    Upstream(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl CdrError {
    /// Shorthand for the common lookup-miss case.
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        CdrError::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }
}

pub type CdrResult<T> = std::result::Result<T, CdrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_carries_entity_field_and_value() {
        let err = CdrError::not_found("Patient", "Id", 42);
        assert_eq!(err.to_string(), "Patient not found with Id: 42");
    }

    #[test]
    fn conflict_message_is_prefixed() {
        let err = CdrError::Conflict("patient already enrolled in program".into());
        assert!(err.to_string().starts_with("conflict:"));
    }
}

//! The acting user on whose behalf a command runs.
//!
//! Authentication is owned by the transport layer; the core never reads the
//! acting user from ambient state. Every mutating operation takes a
//! [`Principal`] explicitly so audit stamps are attributable per request.

/// Identity of the authenticated user performing an operation.
///
/// The id is the person id the demographic service assigned to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub person_id: i64,
}

impl Principal {
    pub fn new(person_id: i64) -> Self {
        Self { person_id }
    }
}

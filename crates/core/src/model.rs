//! Domain entities of the patient service.
//!
//! Relationships are foreign-key style: the owning side stores an id and
//! lookups go through the store, so no in-memory cyclic object graphs exist.
//! Every entity embeds an [`AuditTrail`]; none is ever physically deleted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::audit::AuditTrail;

/// A patient record. The id is shared with the Person record owned by the
/// external demographic service; this service never assigns it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: i64,
    /// Free-text clinical note.
    pub allergies: Option<String>,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

/// A named identifier schema (MRN, national id, insurance number, ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatientIdentifierType {
    pub patient_identifier_type_id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Format pattern identifiers of this type must match.
    pub format: Option<String>,
    pub required: bool,
    pub is_unique: bool,
    pub format_hint: Option<String>,
    pub validator: Option<String>,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

/// A (patient, type, value) identifier tuple.
///
/// The value is immutable after creation; only `preferred` and
/// `location_id` may change. For a given (patient, type) pair at most one
/// non-voided identifier carries `preferred = true`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatientIdentifier {
    pub patient_identifier_id: i64,
    pub patient_id: i64,
    pub identifier_type_id: i32,
    pub identifier: String,
    pub preferred: bool,
    pub location_id: i32,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

/// A care program patients can be enrolled in. Name and code are unique.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Program {
    pub program_id: i32,
    pub name: String,
    pub program_code: String,
    pub description: Option<String>,
    pub active: bool,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

/// A patient's enrollment in a program.
///
/// At most one row ever exists per (patient, program) pair; re-enrollment
/// after completion is not modeled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatientProgram {
    pub patient_program_id: i64,
    pub patient_id: i64,
    pub program_id: i32,
    pub location_id: i32,
    pub date_enrolled: NaiveDate,
    pub date_completed: Option<NaiveDate>,
    pub outcome_concept_id: Option<i32>,
    pub outcome_comment: Option<String>,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

//! Storage abstraction for the patient service.
//!
//! One trait per aggregate, method-per-query. Each method is a complete
//! transaction: implementations must apply it atomically with respect to
//! concurrent callers, and the insert/update paths must enforce the
//! uniqueness constraints below so racing requests surface as
//! [`CdrError::Conflict`](crate::error::CdrError) instead of corrupting an
//! invariant:
//!
//! - identifier value is globally unique, voided rows included;
//! - at most one non-voided identifier per (patient, type) has
//!   `preferred = true`;
//! - at most one enrollment row per (patient, program), voided or not;
//! - program name and code are unique; identifier type name is unique.

mod memory;

pub use memory::MemoryStore;

use crate::error::CdrResult;
use crate::model::{Patient, PatientIdentifier, PatientIdentifierType, PatientProgram, Program};

pub trait PatientStore: Send + Sync {
    fn insert_patient(&self, patient: Patient) -> CdrResult<Patient>;
    /// Looks up a patient by id. `include_voided` widens the search to
    /// voided records.
    fn find_patient(&self, patient_id: i64, include_voided: bool) -> CdrResult<Option<Patient>>;
    fn update_patient(&self, patient: Patient) -> CdrResult<Patient>;
    fn list_active_patients(&self) -> CdrResult<Vec<Patient>>;
    fn list_all_patients(&self) -> CdrResult<Vec<Patient>>;
    fn find_patients_by_program(&self, program_id: i32) -> CdrResult<Vec<Patient>>;
    /// Patients enrolled in the program, filtered by the program's
    /// active flag.
    fn find_patients_by_program_and_status(
        &self,
        program_id: i32,
        active: bool,
    ) -> CdrResult<Vec<Patient>>;
    fn find_patients_by_identifier_type(&self, type_id: i32) -> CdrResult<Vec<Patient>>;
}

pub trait IdentifierStore: Send + Sync {
    fn insert_identifier(&self, identifier: PatientIdentifier) -> CdrResult<PatientIdentifier>;
    fn find_identifier(&self, identifier_id: i64) -> CdrResult<Option<PatientIdentifier>>;
    fn find_identifier_by_value(&self, value: &str) -> CdrResult<Option<PatientIdentifier>>;
    /// The single preferred, non-voided identifier of the pair. More than
    /// one match is a data-integrity error.
    fn find_preferred_identifier(
        &self,
        patient_id: i64,
        type_id: i32,
    ) -> CdrResult<Option<PatientIdentifier>>;
    /// Clears the preferred flag on every non-voided identifier of the
    /// (patient, type) pair, stamping each cleared record as modified by
    /// `modified_by`. Returns how many records were cleared.
    fn reset_preferred(&self, patient_id: i64, type_id: i32, modified_by: i64) -> CdrResult<usize>;
    fn update_identifier(&self, identifier: PatientIdentifier) -> CdrResult<PatientIdentifier>;
    /// Non-voided identifiers of a patient.
    fn list_identifiers_for_patient(&self, patient_id: i64) -> CdrResult<Vec<PatientIdentifier>>;
}

pub trait IdentifierTypeStore: Send + Sync {
    fn insert_identifier_type(
        &self,
        identifier_type: PatientIdentifierType,
    ) -> CdrResult<PatientIdentifierType>;
    fn find_identifier_type(&self, type_id: i32) -> CdrResult<Option<PatientIdentifierType>>;
    fn update_identifier_type(
        &self,
        identifier_type: PatientIdentifierType,
    ) -> CdrResult<PatientIdentifierType>;
    fn list_identifier_types(&self) -> CdrResult<Vec<PatientIdentifierType>>;
}

pub trait ProgramStore: Send + Sync {
    fn insert_program(&self, program: Program) -> CdrResult<Program>;
    fn find_program(&self, program_id: i32) -> CdrResult<Option<Program>>;
    fn update_program(&self, program: Program) -> CdrResult<Program>;
    fn list_programs(&self) -> CdrResult<Vec<Program>>;
}

pub trait EnrollmentStore: Send + Sync {
    fn insert_enrollment(&self, enrollment: PatientProgram) -> CdrResult<PatientProgram>;
    fn find_enrollment(&self, enrollment_id: i64) -> CdrResult<Option<PatientProgram>>;
    fn find_enrollment_by_patient_and_program(
        &self,
        patient_id: i64,
        program_id: i32,
    ) -> CdrResult<Option<PatientProgram>>;
    fn update_enrollment(&self, enrollment: PatientProgram) -> CdrResult<PatientProgram>;
    /// Non-voided enrollments of a patient.
    fn list_enrollments_for_patient(&self, patient_id: i64) -> CdrResult<Vec<PatientProgram>>;
}

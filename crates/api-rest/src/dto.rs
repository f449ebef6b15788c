//! Wire types for the REST API and their mappings from domain entities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use cdr_core::audit::AuditTrail;
use cdr_core::clients::{LocationRecord, PersonRecord};
use cdr_core::model::{
    Patient, PatientIdentifier, PatientIdentifierType, PatientProgram, Program,
};
use cdr_core::services::HydratedPatient;

/// Audit fields echoed on every resource representation.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuditDto {
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub last_modified_by: Option<i64>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub voided: bool,
    pub voided_by: Option<i64>,
    pub voided_at: Option<DateTime<Utc>>,
    pub void_reason: Option<String>,
    pub uuid: Uuid,
}

impl From<AuditTrail> for AuditDto {
    fn from(audit: AuditTrail) -> Self {
        Self {
            created_by: audit.created_by,
            created_at: audit.created_at,
            last_modified_by: audit.last_modified_by,
            last_modified_at: audit.last_modified_at,
            voided: audit.voided,
            voided_by: audit.voided_by,
            voided_at: audit.voided_at,
            void_reason: audit.void_reason,
            uuid: audit.uuid,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PersonDto {
    pub person_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl From<PersonRecord> for PersonDto {
    fn from(person: PersonRecord) -> Self {
        Self {
            person_id: person.person_id,
            first_name: person.first_name,
            last_name: person.last_name,
            gender: person.gender,
            birth_date: person.birth_date,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    pub location_id: i32,
    pub name: String,
}

impl From<LocationRecord> for LocationDto {
    fn from(location: LocationRecord) -> Self {
        Self {
            location_id: location.location_id,
            name: location.name,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PatientDto {
    pub patient_id: i64,
    pub allergies: Option<String>,
    /// Demographic portion; absent when the demographic service has no
    /// record or is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonDto>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub identifiers: Vec<PatientIdentifierDto>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub enrollments: Vec<PatientProgramDto>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<LocationDto>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

impl From<Patient> for PatientDto {
    fn from(patient: Patient) -> Self {
        Self {
            patient_id: patient.patient_id,
            allergies: patient.allergies,
            person: None,
            identifiers: Vec::new(),
            enrollments: Vec::new(),
            locations: Vec::new(),
            audit: patient.audit.into(),
        }
    }
}

impl From<HydratedPatient> for PatientDto {
    fn from(hydrated: HydratedPatient) -> Self {
        let mut dto = PatientDto::from(hydrated.patient);
        dto.person = hydrated.person.map(PersonDto::from);
        dto.identifiers = hydrated
            .identifiers
            .into_iter()
            .map(PatientIdentifierDto::from)
            .collect();
        dto.enrollments = hydrated
            .enrollments
            .into_iter()
            .map(PatientProgramDto::from)
            .collect();
        dto.locations = hydrated
            .locations
            .into_iter()
            .map(LocationDto::from)
            .collect();
        dto
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PatientIdentifierDto {
    pub patient_identifier_id: i64,
    pub patient_id: i64,
    pub identifier_type_id: i32,
    pub identifier: String,
    pub preferred: bool,
    pub location_id: i32,
    #[serde(flatten)]
    pub audit: AuditDto,
}

impl From<PatientIdentifier> for PatientIdentifierDto {
    fn from(identifier: PatientIdentifier) -> Self {
        Self {
            patient_identifier_id: identifier.patient_identifier_id,
            patient_id: identifier.patient_id,
            identifier_type_id: identifier.identifier_type_id,
            identifier: identifier.identifier,
            preferred: identifier.preferred,
            location_id: identifier.location_id,
            audit: identifier.audit.into(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PatientIdentifierTypeDto {
    pub patient_identifier_type_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub format: Option<String>,
    pub required: bool,
    pub is_unique: bool,
    pub format_hint: Option<String>,
    pub validator: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

impl From<PatientIdentifierType> for PatientIdentifierTypeDto {
    fn from(identifier_type: PatientIdentifierType) -> Self {
        Self {
            patient_identifier_type_id: identifier_type.patient_identifier_type_id,
            name: identifier_type.name,
            description: identifier_type.description,
            format: identifier_type.format,
            required: identifier_type.required,
            is_unique: identifier_type.is_unique,
            format_hint: identifier_type.format_hint,
            validator: identifier_type.validator,
            audit: identifier_type.audit.into(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProgramDto {
    pub program_id: i32,
    pub name: String,
    pub program_code: String,
    pub description: Option<String>,
    pub active: bool,
    #[serde(flatten)]
    pub audit: AuditDto,
}

impl From<Program> for ProgramDto {
    fn from(program: Program) -> Self {
        Self {
            program_id: program.program_id,
            name: program.name,
            program_code: program.program_code,
            description: program.description,
            active: program.active,
            audit: program.audit.into(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PatientProgramDto {
    pub patient_program_id: i64,
    pub patient_id: i64,
    pub program_id: i32,
    pub location_id: i32,
    pub date_enrolled: NaiveDate,
    pub date_completed: Option<NaiveDate>,
    pub outcome_concept_id: Option<i32>,
    pub outcome_comment: Option<String>,
    #[serde(flatten)]
    pub audit: AuditDto,
}

impl From<PatientProgram> for PatientProgramDto {
    fn from(enrollment: PatientProgram) -> Self {
        Self {
            patient_program_id: enrollment.patient_program_id,
            patient_id: enrollment.patient_id,
            program_id: enrollment.program_id,
            location_id: enrollment.location_id,
            date_enrolled: enrollment.date_enrolled,
            date_completed: enrollment.date_completed,
            outcome_concept_id: enrollment.outcome_concept_id,
            outcome_comment: enrollment.outcome_comment,
            audit: enrollment.audit.into(),
        }
    }
}

// ---- request bodies ----

#[derive(Deserialize, ToSchema)]
pub struct CreatePatientReq {
    /// Person id assigned by the demographic service.
    pub patient_id: i64,
    pub allergies: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePatientReq {
    pub allergies: Option<String>,
}

/// Body of every void (DELETE) request.
#[derive(Deserialize, ToSchema)]
pub struct VoidReq {
    pub void_reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignIdentifierReq {
    pub patient_id: i64,
    pub identifier_type_id: i32,
    pub identifier: String,
    #[serde(default)]
    pub preferred: bool,
    pub location_id: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateIdentifierReq {
    pub preferred: bool,
    pub location_id: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct EnrollReq {
    pub date_enrolled: NaiveDate,
    pub location_id: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct CompleteEnrollmentReq {
    pub date_completed: NaiveDate,
    pub outcome_concept_id: Option<i32>,
    pub outcome_comment: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ProgramReq {
    pub name: String,
    pub program_code: String,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize, ToSchema)]
pub struct IdentifierTypeReq {
    pub name: String,
    pub description: Option<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub is_unique: bool,
    pub format_hint: Option<String>,
    pub validator: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}
